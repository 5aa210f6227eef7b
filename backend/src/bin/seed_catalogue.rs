//! Apply a JSON catalogue seed (courses and accounts) to PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use academy::domain::{CatalogueSeeder, SeedDocument};
use academy::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use clap::Parser;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_ENV: &str = "ACADEMY_DATABASE_URL";

/// `seed-catalogue` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-catalogue",
    about = "Upsert courses and accounts from a JSON seed document",
    version
)]
struct CliArgs {
    /// Path to the JSON seed document.
    #[arg(long = "file", value_name = "path")]
    file: PathBuf,
    /// Database connection URL. Falls back to `ACADEMY_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Skip embedded migrations before seeding.
    #[arg(long = "skip-migrations")]
    skip_migrations: bool,
}

fn main() -> io::Result<()> {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let raw = std::fs::read_to_string(&args.file).map_err(|error| {
        io::Error::other(format!("read seed file '{}': {error}", args.file.display()))
    })?;
    let document = SeedDocument::from_json(&raw)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error.to_string()))?;

    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;
    if !args.skip_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(|error| io::Error::other(format!("run migrations: {error}")))?;
        info!("migrations applied");
    }
    let pool = DbPool::connect(PoolConfig::new(&database_url).with_max_connections(2))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let seeder = CatalogueSeeder::new(
        Arc::new(DieselCourseRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool)),
    );
    let outcome = seeder
        .apply(&document)
        .await
        .map_err(|error| io::Error::other(format!("seed failed: {error}")))?;

    println!("courses={}", outcome.courses);
    println!("users={}", outcome.users);
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{DATABASE_URL_ENV} must not be empty"),
        )),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("database URL missing: set --database-url or {DATABASE_URL_ENV}"),
        )),
    }
}
