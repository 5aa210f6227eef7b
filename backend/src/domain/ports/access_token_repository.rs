//! Port for bearer token persistence.

use async_trait::async_trait;

use crate::domain::AccessTokenRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by access token repository adapters.
    pub enum AccessTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

/// Storage of issued bearer token digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Persist a newly issued token.
    async fn insert(&self, record: &AccessTokenRecord) -> Result<(), AccessTokenRepositoryError>;

    /// Find a token by the digest of its raw value.
    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AccessTokenRecord>, AccessTokenRepositoryError>;
}
