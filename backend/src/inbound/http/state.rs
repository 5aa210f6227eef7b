//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogueQuery, LessonCommentsCommand, LessonCommentsQuery, LoginService, ProgressCommand,
    ProgressQuery, TokenVerifier,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use academy::domain::{
///     AuthService, CatalogueService, DEFAULT_TOKEN_TTL_SECONDS, LessonCommentService,
///     ProgressService,
/// };
/// use academy::domain::ports::FixtureProgressCache;
/// use academy::inbound::http::state::HttpState;
/// use academy::outbound::memory::{
///     InMemoryAccessTokenRepository, InMemoryCourseRepository,
///     InMemoryLessonCommentRepository, InMemoryProgressRepository, InMemoryUserRepository,
/// };
/// use mockable::DefaultClock;
///
/// let clock = Arc::new(DefaultClock);
/// let users = Arc::new(InMemoryUserRepository::new());
/// let courses = Arc::new(InMemoryCourseRepository::new());
/// let auth = Arc::new(AuthService::new(
///     users.clone(),
///     Arc::new(InMemoryAccessTokenRepository::new()),
///     clock.clone(),
///     chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
/// ));
/// let progress = Arc::new(ProgressService::new(
///     Arc::new(InMemoryProgressRepository::new()),
///     courses.clone(),
///     Arc::new(FixtureProgressCache),
///     clock.clone(),
/// ));
/// let comments = Arc::new(LessonCommentService::new(
///     Arc::new(InMemoryLessonCommentRepository::new()),
///     courses.clone(),
///     users,
///     clock,
/// ));
/// let state = HttpState {
///     login: auth.clone(),
///     tokens: auth,
///     catalogue: Arc::new(CatalogueService::new(courses)),
///     progress: progress.clone(),
///     progress_command: progress,
///     comments: comments.clone(),
///     comments_command: comments,
/// };
/// let _tokens = state.tokens.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Credential exchange for `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// Bearer token verification used by the [`super::auth::BearerAuth`] extractor.
    pub tokens: Arc<dyn TokenVerifier>,
    /// Course listing and structure.
    pub catalogue: Arc<dyn CatalogueQuery>,
    /// Progress reads and summaries.
    pub progress: Arc<dyn ProgressQuery>,
    /// Progress writes.
    pub progress_command: Arc<dyn ProgressCommand>,
    /// Lesson thread reads.
    pub comments: Arc<dyn LessonCommentsQuery>,
    /// Questions and replies.
    pub comments_command: Arc<dyn LessonCommentsCommand>,
}
