//! Driving ports for authentication.
//!
//! Inbound adapters call these ports to exchange credentials for a bearer
//! token and to resolve a bearer token back to an identity, without knowing
//! how either is stored.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, IssuedToken, LoginCredentials};

/// Exchange credentials for a bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a token.
    ///
    /// # Errors
    /// `Unauthorized` for an unknown user or wrong password, without saying
    /// which.
    async fn login(&self, credentials: LoginCredentials) -> Result<IssuedToken, Error>;
}

/// Resolve a bearer credential to an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Return the identity behind `token`, or `None` when the token is
    /// unknown or expired.
    async fn verify(&self, token: &str) -> Result<Option<AuthenticatedUser>, Error>;
}
