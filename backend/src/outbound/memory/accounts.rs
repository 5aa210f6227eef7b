//! In-memory accounts and bearer tokens.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{
    AccessTokenRepository, AccessTokenRepositoryError, UserCredentialsRecord, UserRepository,
    UserRepositoryError,
};
use crate::domain::{AccessTokenRecord, User, UserId};

/// Account store keyed by username.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserCredentialsRecord>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentialsRecord>, UserRepositoryError> {
        Ok(lock(&self.users).get(username).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(lock(&self.users)
            .values()
            .find(|record| record.user.id() == id)
            .map(|record| record.user.clone()))
    }

    async fn upsert(&self, record: &UserCredentialsRecord) -> Result<(), UserRepositoryError> {
        lock(&self.users).insert(record.user.username().to_owned(), record.clone());
        Ok(())
    }
}

/// Token store keyed by digest.
#[derive(Default)]
pub struct InMemoryAccessTokenRepository {
    tokens: Mutex<HashMap<String, AccessTokenRecord>>,
}

impl InMemoryAccessTokenRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn insert(&self, record: &AccessTokenRecord) -> Result<(), AccessTokenRepositoryError> {
        lock(&self.tokens).insert(record.token_digest.clone(), record.clone());
        Ok(())
    }

    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AccessTokenRecord>, AccessTokenRepositoryError> {
        Ok(lock(&self.tokens).get(token_digest).cloned())
    }
}
