//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Stored data could not be mapped into the domain model.
        Mapping { message: String } => "user repository returned invalid data: {message}",
    }
}

/// A user together with their stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentialsRecord {
    /// Account details.
    pub user: User,
    /// Random per-user salt.
    pub password_salt: String,
    /// Hex SHA-256 over salt and password.
    pub password_digest: String,
}

/// Account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up an account and its credentials by login name.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentialsRecord>, UserRepositoryError>;

    /// Look up an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Insert or replace an account keyed by username.
    async fn upsert(&self, record: &UserCredentialsRecord) -> Result<(), UserRepositoryError>;
}
