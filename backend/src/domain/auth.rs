//! Authentication primitives: login credentials, bearer tokens and digests.
//!
//! Raw bearer tokens and passwords never reach storage. Both are reduced to
//! SHA-256 digests before a repository sees them.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::{Role, UserId};

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use academy::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "lovelace").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account the token was issued to.
    pub user_id: UserId,
    /// Role at the time of verification.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Convenience constructor.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Bearer token handed to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Opaque credential; only its digest is persisted.
    pub token: Zeroizing<String>,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
    /// Identity the token resolves to.
    pub user: AuthenticatedUser,
}

/// Stored form of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    /// Hex SHA-256 of the raw token.
    pub token_digest: String,
    /// Owner of the token.
    pub user_id: UserId,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    /// Whether the token is still usable at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Generate a fresh opaque bearer token (hex encoded, 256 bits).
pub fn generate_token() -> Zeroizing<String> {
    let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
    OsRng.fill_bytes(&mut bytes[..]);
    Zeroizing::new(hex::encode(&bytes[..]))
}

/// Generate a random password salt (hex encoded).
pub fn generate_salt() -> String {
    let mut bytes = [0_u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest a bearer token for storage and lookup.
///
/// # Examples
/// ```
/// use academy::domain::digest_token;
///
/// assert_eq!(digest_token("abc").len(), 64);
/// assert_eq!(digest_token("abc"), digest_token("abc"));
/// ```
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Digest a password with its salt.
pub fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a candidate password against a stored salted digest in constant
/// time.
pub fn password_matches(salt: &str, password: &str, expected_digest: &str) -> bool {
    let candidate = digest_password(salt, password);
    bool::from(candidate.as_bytes().ct_eq(expected_digest.as_bytes()))
}
