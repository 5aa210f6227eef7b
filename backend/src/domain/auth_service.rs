//! Authentication service issuing and verifying opaque bearer tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AccessTokenRepository, AccessTokenRepositoryError, LoginService, TokenVerifier,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    AccessTokenRecord, AuthenticatedUser, Error, IssuedToken, LoginCredentials, digest_token,
    generate_token, password_matches,
};

/// Default bearer token lifetime in seconds (12 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Login and token verification over user and token repositories.
#[derive(Clone)]
pub struct AuthService<U, T> {
    users: Arc<U>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    token_ttl: Duration,
}

impl<U, T> AuthService<U, T> {
    /// Create a service issuing tokens valid for `token_ttl`.
    pub fn new(users: Arc<U>, tokens: Arc<T>, clock: Arc<dyn Clock>, token_ttl: Duration) -> Self {
        Self {
            users,
            tokens,
            clock,
            token_ttl,
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    Error::internal(format!("user repository error: {error}"))
}

fn map_token_error(error: AccessTokenRepositoryError) -> Error {
    Error::internal(format!("token repository error: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl<U, T> LoginService for AuthService<U, T>
where
    U: UserRepository,
    T: AccessTokenRepository,
{
    async fn login(&self, credentials: LoginCredentials) -> Result<IssuedToken, Error> {
        let Some(stored) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(invalid_credentials());
        };
        if !password_matches(
            &stored.password_salt,
            credentials.password(),
            &stored.password_digest,
        ) {
            debug!(username = credentials.username(), "login with wrong password");
            return Err(invalid_credentials());
        }

        let token = generate_token();
        let expires_at = self.clock.utc() + self.token_ttl;
        let user = AuthenticatedUser::new(stored.user.id().clone(), stored.user.role());
        self.tokens
            .insert(&AccessTokenRecord {
                token_digest: digest_token(&token),
                user_id: user.user_id.clone(),
                expires_at,
            })
            .await
            .map_err(map_token_error)?;
        info!(user_id = %user.user_id, role = %user.role, "bearer token issued");

        Ok(IssuedToken {
            token,
            expires_at,
            user,
        })
    }
}

#[async_trait]
impl<U, T> TokenVerifier for AuthService<U, T>
where
    U: UserRepository,
    T: AccessTokenRepository,
{
    async fn verify(&self, token: &str) -> Result<Option<AuthenticatedUser>, Error> {
        let Some(record) = self
            .tokens
            .find_by_digest(&digest_token(token))
            .await
            .map_err(map_token_error)?
        else {
            return Ok(None);
        };
        if !record.is_live_at(self.clock.utc()) {
            debug!(user_id = %record.user_id, "expired bearer token presented");
            return Ok(None);
        }
        let user = self
            .users
            .find_by_id(&record.user_id)
            .await
            .map_err(map_user_error)?;
        Ok(user.map(|user| AuthenticatedUser::new(user.id().clone(), user.role())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccessTokenRepository, MockUserRepository, UserCredentialsRecord,
    };
    use crate::domain::{DisplayName, ErrorCode, Role, User, UserId, digest_password};
    use crate::test_support::MutableClock;
    use rstest::{fixture, rstest};

    const SALT: &str = "a1b2c3";

    #[fixture]
    fn ada() -> User {
        User::new(
            UserId::random(),
            "ada",
            DisplayName::new("Ada Lovelace").expect("valid name"),
            Role::Student,
        )
    }

    fn credentials_for(user: &User, password: &str) -> UserCredentialsRecord {
        UserCredentialsRecord {
            user: user.clone(),
            password_salt: SALT.to_owned(),
            password_digest: digest_password(SALT, password),
        }
    }

    fn service(
        users: MockUserRepository,
        tokens: MockAccessTokenRepository,
        clock: Arc<MutableClock>,
    ) -> AuthService<MockUserRepository, MockAccessTokenRepository> {
        AuthService::new(Arc::new(users), Arc::new(tokens), clock, Duration::hours(1))
    }

    #[rstest]
    #[tokio::test]
    async fn login_issues_a_token_and_stores_only_its_digest(ada: User) {
        let clock = Arc::new(MutableClock::at_epoch());
        let expected_expiry = clock.utc() + Duration::hours(1);
        let record = credentials_for(&ada, "analytical-engine");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|username| username == "ada")
            .return_once(move |_| Ok(Some(record)));
        let mut tokens = MockAccessTokenRepository::new();
        tokens
            .expect_insert()
            .withf(move |stored| stored.token_digest.len() == 64 && stored.expires_at == expected_expiry)
            .times(1)
            .return_once(|_| Ok(()));

        let issued = service(users, tokens, clock)
            .login(LoginCredentials::try_from_parts("ada", "analytical-engine").expect("creds"))
            .await
            .expect("login succeeds");

        assert_eq!(issued.user.user_id, *ada.id());
        assert_eq!(issued.user.role, Role::Student);
        assert_eq!(issued.expires_at, expected_expiry);
        assert_eq!(issued.token.len(), 64);
    }

    #[rstest]
    #[case::wrong_password(true)]
    #[case::unknown_user(false)]
    #[tokio::test]
    async fn bad_credentials_are_unauthorized(ada: User, #[case] user_exists: bool) {
        let record = credentials_for(&ada, "analytical-engine");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .return_once(move |_| Ok(user_exists.then_some(record)));
        let mut tokens = MockAccessTokenRepository::new();
        tokens.expect_insert().never();

        let error = service(users, tokens, Arc::new(MutableClock::at_epoch()))
            .login(LoginCredentials::try_from_parts("ada", "difference-engine").expect("creds"))
            .await
            .expect_err("login fails");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "invalid credentials");
    }

    #[rstest]
    #[tokio::test]
    async fn verify_resolves_live_tokens_and_rejects_expired_ones(ada: User) {
        let clock = Arc::new(MutableClock::at_epoch());
        let stored = AccessTokenRecord {
            token_digest: digest_token("raw-token"),
            user_id: ada.id().clone(),
            expires_at: clock.utc() + Duration::minutes(10),
        };
        let mut tokens = MockAccessTokenRepository::new();
        tokens
            .expect_find_by_digest()
            .withf(|digest| digest == digest_token("raw-token"))
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));
        let mut users = MockUserRepository::new();
        let user = ada.clone();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(user)));

        let auth = service(users, tokens, Arc::clone(&clock));
        let live = auth.verify("raw-token").await.expect("verify succeeds");
        assert_eq!(live, Some(AuthenticatedUser::new(ada.id().clone(), Role::Student)));

        clock.advance_seconds(600);
        let expired = auth.verify("raw-token").await.expect("verify succeeds");
        assert!(expired.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_tokens_verify_to_none() {
        let mut tokens = MockAccessTokenRepository::new();
        tokens.expect_find_by_digest().return_once(|_| Ok(None));

        let auth = service(
            MockUserRepository::new(),
            tokens,
            Arc::new(MutableClock::at_epoch()),
        );
        assert!(auth.verify("nope").await.expect("verify succeeds").is_none());
    }
}
