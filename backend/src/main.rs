//! Backend entry-point: loads settings, prepares storage and serves the REST API.

mod server;

use academy::domain::SeedDocument;
use academy::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server};

async fn attach_database(
    config: ServerConfig,
    settings: &AppSettings,
) -> std::io::Result<ServerConfig> {
    let Some(database_url) = settings.database_url.as_deref() else {
        warn!("no database URL configured; serving from in-memory storage");
        return Ok(config);
    };
    if settings.run_migrations() {
        run_pending_migrations(database_url)
            .await
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        info!("database migrations applied");
    }
    let pool = DbPool::connect(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
    Ok(config.with_db_pool(pool))
}

fn attach_seed(config: ServerConfig, settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let Some(path) = settings.seed_file.as_deref() else {
        return Ok(config);
    };
    let raw = std::fs::read_to_string(path)?;
    let seed = SeedDocument::from_json(&raw).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("seed file {}: {err}", path.display()),
        )
    })?;
    Ok(config.with_seed(seed))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("configuration error: {err}")))?;
    let config = ServerConfig::from_settings(&settings)?;
    let config = attach_database(config, &settings).await?;
    let config = attach_seed(config, &settings)?;
    let bind_addr = config.bind_addr;

    let server = create_server(config).await?;
    info!(%bind_addr, "listening");
    server.await
}
