//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, cache) are implemented by outbound adapters.
//! Driving ports (queries, commands, authentication) are implemented by
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_repository;
mod catalogue_query;
mod course_repository;
mod lesson_comment_repository;
mod lesson_comments;
mod login_service;
mod progress_cache;
mod progress_command;
mod progress_query;
mod progress_repository;
mod user_repository;

#[cfg(test)]
pub use access_token_repository::MockAccessTokenRepository;
pub use access_token_repository::{AccessTokenRepository, AccessTokenRepositoryError};
pub use catalogue_query::CatalogueQuery;
#[cfg(test)]
pub use catalogue_query::MockCatalogueQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use lesson_comment_repository::MockLessonCommentRepository;
pub use lesson_comment_repository::{LessonCommentRepository, LessonCommentRepositoryError};
#[cfg(test)]
pub use lesson_comments::{MockLessonCommentsCommand, MockLessonCommentsQuery};
pub use lesson_comments::{
    LessonCommentsCommand, LessonCommentsQuery, LessonRef, PostCommentRequest,
};
#[cfg(test)]
pub use login_service::{MockLoginService, MockTokenVerifier};
pub use login_service::{LoginService, TokenVerifier};
#[cfg(test)]
pub use progress_cache::MockProgressCache;
pub use progress_cache::{
    DEFAULT_PROGRESS_CACHE_TTL, FixtureProgressCache, ProgressCache, ProgressCacheError,
    ProgressCacheKey,
};
#[cfg(test)]
pub use progress_command::MockProgressCommand;
pub use progress_command::{
    EnrollmentHandle, ProgressCommand, UpdateProgressRequest, UpdateProgressResponse,
};
#[cfg(test)]
pub use progress_query::MockProgressQuery;
pub use progress_query::{CacheStatus, ProgressQuery, ProgressRequest, ProgressView};
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
pub use progress_repository::{ProgressRepository, ProgressRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentialsRecord, UserRepository, UserRepositoryError};
