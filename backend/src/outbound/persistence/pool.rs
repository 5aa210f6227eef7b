//! Shared PostgreSQL connections for the Diesel repositories.
//!
//! Every repository holds a clone of one [`DbPool`]. Progress reads and
//! writes are short single-statement calls, so the pool stays small and
//! fails fast: a request that cannot get a connection within the checkout
//! timeout surfaces as a repository `Connection` error (HTTP 500) instead of
//! queueing behind a stalled database.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Connection limit used by the server unless overridden.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

/// How long a request waits for a free connection.
pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection checked out of a [`DbPool`].
pub type PooledPgConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Failures setting up or drawing from the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection could be handed out before the checkout timeout.
    #[error("no database connection available: {message}")]
    Unavailable { message: String },

    /// The pool rejected its configuration or could not reach the server.
    #[error("database pool setup failed: {message}")]
    Setup { message: String },
}

impl PoolError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}

/// Target database and sizing for a [`DbPool`].
///
/// Connections are opened lazily; no idle floor is kept, so a server that
/// only serves cached progress holds none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Server defaults for `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the number of open connections; zero is raised to one.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Cloneable handle to the shared connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool described by `config`.
    ///
    /// # Errors
    /// [`PoolError::Setup`] when bb8 rejects the configuration.
    pub async fn connect(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        Pool::builder()
            .max_size(config.max_connections)
            .min_idle(None)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::setup(err.to_string()))
    }

    /// Borrow a connection for one repository call.
    ///
    /// # Errors
    /// [`PoolError::Unavailable`] when the checkout timeout elapses.
    pub async fn connection(&self) -> Result<PooledPgConnection<'_>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn server_defaults_fail_fast() {
        let config = PoolConfig::new("postgres://localhost/academy");

        assert_eq!(config.database_url(), "postgres://localhost/academy");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.checkout_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(2, 2)]
    fn connection_cap_is_at_least_one(#[case] requested: u32, #[case] expected: u32) {
        let config = PoolConfig::new("postgres://localhost/academy").with_max_connections(requested);
        assert_eq!(config.max_connections, expected);
    }

    #[rstest]
    fn checkout_timeout_can_be_tightened() {
        let config = PoolConfig::new("postgres://localhost/academy")
            .with_checkout_timeout(Duration::from_millis(250));
        assert_eq!(config.checkout_timeout, Duration::from_millis(250));
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }
}
