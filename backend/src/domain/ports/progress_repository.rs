//! Port for enrollment and progress record persistence.

use async_trait::async_trait;

use crate::domain::{CourseId, Enrollment, EnrollmentId, LessonPosition, ProgressRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by progress repository adapters.
    pub enum ProgressRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "progress repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "progress repository query failed: {message}",
    }
}

/// Storage for enrollments and their progress records.
///
/// ## Invariants
/// - At most one enrollment per `(user, course)`.
/// - At most one record per `(enrollment, module_index, lesson_index)`;
///   [`ProgressRepository::upsert_record`] replaces rather than duplicates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Find the enrollment for a user and course.
    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, ProgressRepositoryError>;

    /// Insert `enrollment` unless one already exists for the same user and
    /// course, returning whichever enrollment is stored afterwards.
    async fn create_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, ProgressRepositoryError>;

    /// All records for an enrollment ordered by module then lesson.
    async fn list_records(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError>;

    /// The record at `position`, if any.
    async fn find_record(
        &self,
        enrollment_id: &EnrollmentId,
        position: &LessonPosition,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError>;

    /// Insert or replace the record keyed by enrollment and position.
    async fn upsert_record(&self, record: &ProgressRecord) -> Result<(), ProgressRepositoryError>;
}
