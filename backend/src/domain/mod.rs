//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Role, AuthenticatedUser: identities and authorisation.
//! - CourseStructure, LessonPosition: the read-only catalogue model.
//! - Enrollment, ProgressRecord, ProgressSummary: learner progress.
//! - LessonComment: lesson Q&A.
//! - ProgressService, CatalogueService, AuthService, LessonCommentService:
//!   implementations of the driving ports in [`ports`].
//! - CatalogueSeeder: idempotent loading of courses and accounts.

pub mod auth;
pub mod auth_service;
pub mod catalogue_seed;
pub mod catalogue_service;
pub mod comment;
pub mod comment_service;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod ports;
pub mod progress;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessTokenRecord, AuthenticatedUser, IssuedToken, LoginCredentials, LoginValidationError,
    digest_password, digest_token, generate_salt, generate_token, password_matches,
};
pub use self::auth_service::{AuthService, DEFAULT_TOKEN_TTL_SECONDS};
pub use self::catalogue_seed::{
    CatalogueSeedError, CatalogueSeeder, SeedCourse, SeedDocument, SeedOutcome, SeedUser,
};
pub use self::catalogue_service::CatalogueService;
pub use self::comment::{
    COMMENT_BODY_MAX, CommentAuthor, CommentBody, CommentBodyError, CommentId, LessonComment,
};
pub use self::comment_service::LessonCommentService;
pub use self::course::{CourseId, CourseStructure, CourseSummary, Lesson, LessonPosition, Module};
pub use self::enrollment::{Enrollment, EnrollmentId, EnrollmentOutcome};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::progress::{
    ModuleProgress, ProgressRecord, ProgressService, ProgressSummary, ResumeLesson, ResumeReason,
    aggregate,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DisplayName, Role, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use academy::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
