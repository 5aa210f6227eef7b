//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;

use crate::domain::ports::{
    MockCatalogueQuery, MockLessonCommentsCommand, MockLessonCommentsQuery, MockLoginService,
    MockProgressCommand, MockProgressQuery, MockTokenVerifier,
};
use crate::domain::{AuthenticatedUser, Role, UserId};
use crate::inbound::http::state::HttpState;

/// Token accepted by [`TestPorts::authenticated`].
pub const VALID_TOKEN: &str = "valid-token";

/// A student caller with a fresh id.
pub fn student() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::random(), Role::Student)
}

/// An admin caller with a fresh id.
pub fn admin() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::random(), Role::Admin)
}

/// Attach `Authorization: Bearer` carrying [`VALID_TOKEN`].
pub fn with_bearer(request: TestRequest) -> TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {VALID_TOKEN}")))
}

/// Mock ports for handler tests.
///
/// Mocks without expectations panic when called, so each test only primes the
/// ports its handler should touch.
#[derive(Default)]
pub struct TestPorts {
    pub login: MockLoginService,
    pub tokens: MockTokenVerifier,
    pub catalogue: MockCatalogueQuery,
    pub progress: MockProgressQuery,
    pub progress_command: MockProgressCommand,
    pub comments: MockLessonCommentsQuery,
    pub comments_command: MockLessonCommentsCommand,
}

impl TestPorts {
    /// Ports whose verifier accepts [`VALID_TOKEN`] as `user` and rejects
    /// every other token.
    pub fn authenticated(user: AuthenticatedUser) -> Self {
        let mut tokens = MockTokenVerifier::new();
        tokens
            .expect_verify()
            .returning(move |token| Ok((token == VALID_TOKEN).then(|| user.clone())));
        Self {
            tokens,
            ..Self::default()
        }
    }

    /// Wrap the mocks in [`HttpState`].
    pub fn into_state(self) -> HttpState {
        HttpState {
            login: Arc::new(self.login),
            tokens: Arc::new(self.tokens),
            catalogue: Arc::new(self.catalogue),
            progress: Arc::new(self.progress),
            progress_command: Arc::new(self.progress_command),
            comments: Arc::new(self.comments),
            comments_command: Arc::new(self.comments_command),
        }
    }
}
