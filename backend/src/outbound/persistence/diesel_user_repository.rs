//! PostgreSQL-backed account and bearer token repositories.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AccessTokenRepository, AccessTokenRepositoryError, UserCredentialsRecord, UserRepository,
    UserRepositoryError,
};
use crate::domain::{AccessTokenRecord, DisplayName, Role, User, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{AccessTokenRow, NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::{access_tokens, users};

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserRepositoryError> {
    let display_name = DisplayName::new(row.display_name.clone())
        .map_err(|err| UserRepositoryError::mapping(err.to_string()))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| UserRepositoryError::mapping(err.to_string()))?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        row.username.clone(),
        display_name,
        role,
    ))
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentialsRecord, UserRepositoryError> {
    let user = row_to_user(&row)?;
    Ok(UserCredentialsRecord {
        user,
        password_salt: row.password_salt,
        password_digest: row.password_digest,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentialsRecord>, UserRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn upsert(&self, record: &UserCredentialsRecord) -> Result<(), UserRepositoryError> {
        let user = &record.user;
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            password_salt: &record.password_salt,
            password_digest: &record.password_digest,
        };
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::username)
            .do_update()
            .set((
                users::display_name.eq(excluded(users::display_name)),
                users::role.eq(excluded(users::role)),
                users::password_salt.eq(excluded(users::password_salt)),
                users::password_digest.eq(excluded(users::password_digest)),
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

/// Diesel implementation of [`AccessTokenRepository`].
#[derive(Clone)]
pub struct DieselAccessTokenRepository {
    pool: DbPool,
}

impl DieselAccessTokenRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for DieselAccessTokenRepository {
    async fn insert(&self, record: &AccessTokenRecord) -> Result<(), AccessTokenRepositoryError> {
        let row = AccessTokenRow {
            token_digest: record.token_digest.clone(),
            user_id: *record.user_id.as_uuid(),
            expires_at: record.expires_at,
        };
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        diesel::insert_into(access_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AccessTokenRecord>, AccessTokenRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = access_tokens::table
            .filter(access_tokens::token_digest.eq(token_digest))
            .select(AccessTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| AccessTokenRecord {
            token_digest: row.token_digest,
            user_id: UserId::from_uuid(row.user_id),
            expires_at: row.expires_at,
        }))
    }
}
