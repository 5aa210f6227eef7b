//! Server settings loaded via OrthoConfig and the resolved server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use academy::domain::{DEFAULT_TOKEN_TTL_SECONDS, SeedDocument};
use academy::domain::ports::DEFAULT_PROGRESS_CACHE_TTL;
use academy::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings read from `ACADEMY_*` environment variables, CLI flags and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACADEMY")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Lifetime of per-user progress cache entries.
    pub progress_cache_ttl_seconds: Option<u64>,
    /// Lifetime of issued bearer tokens.
    pub token_ttl_seconds: Option<i64>,
    /// Run embedded migrations before serving; defaults to true.
    pub run_migrations: Option<bool>,
    /// JSON catalogue applied at startup, mainly for in-memory runs.
    pub seed_file: Option<PathBuf>,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    /// Progress cache TTL, 30 seconds unless overridden.
    pub fn progress_cache_ttl(&self) -> Duration {
        self.progress_cache_ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROGRESS_CACHE_TTL)
    }

    /// Whether embedded migrations run before serving, true unless disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Bearer token lifetime, 12 hours unless overridden.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS))
    }
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) progress_cache_ttl: Duration,
    pub(crate) token_ttl: chrono::Duration,
    pub(crate) seed: Option<SeedDocument>,
}

impl ServerConfig {
    /// Start from settings with no database attached.
    pub fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            progress_cache_ttl: settings.progress_cache_ttl(),
            token_ttl: settings.token_ttl(),
            seed: None,
        })
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses Diesel repositories instead of the
    /// in-memory adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Seed document applied before the server starts accepting traffic.
    #[must_use]
    pub fn with_seed(mut self, seed: SeedDocument) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("academy")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ACADEMY_BIND_ADDR", None::<String>),
            ("ACADEMY_DATABASE_URL", None::<String>),
            ("ACADEMY_PROGRESS_CACHE_TTL_SECONDS", None::<String>),
            ("ACADEMY_TOKEN_TTL_SECONDS", None::<String>),
            ("ACADEMY_RUN_MIGRATIONS", None::<String>),
            ("ACADEMY_SEED_FILE", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.progress_cache_ttl(), Duration::from_secs(30));
        assert_eq!(settings.token_ttl(), chrono::Duration::hours(12));
        assert!(settings.run_migrations());
        assert!(settings.seed_file.is_none());
    }

    #[rstest]
    fn migrations_run_when_only_a_database_url_is_set() {
        let _guard = lock_env([
            (
                "ACADEMY_DATABASE_URL",
                Some("postgres://academy@localhost/academy".to_owned()),
            ),
            ("ACADEMY_RUN_MIGRATIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_some());
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACADEMY_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "ACADEMY_DATABASE_URL",
                Some("postgres://academy@localhost/academy".to_owned()),
            ),
            ("ACADEMY_PROGRESS_CACHE_TTL_SECONDS", Some("5".to_owned())),
            ("ACADEMY_TOKEN_TTL_SECONDS", Some("60".to_owned())),
            ("ACADEMY_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let config = ServerConfig::from_settings(&settings).expect("valid settings");
        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(config.progress_cache_ttl, Duration::from_secs(5));
        assert_eq!(config.token_ttl, chrono::Duration::minutes(1));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://academy@localhost/academy")
        );
        assert!(!settings.run_migrations());
    }

    #[rstest]
    fn malformed_bind_addresses_are_rejected() {
        let _guard = lock_env([("ACADEMY_BIND_ADDR", Some("not an address".to_owned()))]);

        let settings = load_from_empty_args();
        assert!(ServerConfig::from_settings(&settings).is_err());
    }
}
