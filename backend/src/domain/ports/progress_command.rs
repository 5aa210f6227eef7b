//! Driving port for progress mutations and enrollment.

use async_trait::async_trait;

use crate::domain::{
    CourseId, Enrollment, EnrollmentOutcome, Error, LessonPosition, ProgressRecord, UserId,
};

/// Toggle of one lesson's completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProgressRequest {
    /// Authenticated learner.
    pub user_id: UserId,
    /// Course containing the lesson.
    pub course_id: CourseId,
    /// Lesson being toggled.
    pub position: LessonPosition,
    /// New completion state.
    pub completed: bool,
}

/// Result of a progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProgressResponse {
    /// Every record of the enrollment after the update.
    pub records: Vec<ProgressRecord>,
    /// Whether the update created the enrollment.
    pub enrollment: EnrollmentOutcome,
}

/// Enrollment together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentHandle {
    /// Stored enrollment.
    pub enrollment: Enrollment,
    /// Whether the call created it.
    pub outcome: EnrollmentOutcome,
}

/// Use-case port for progress writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCommand: Send + Sync {
    /// Fetch the learner's enrollment in a course, creating it when absent.
    ///
    /// # Errors
    /// - `NotFound` when the course does not exist.
    /// - `InternalError` when the store fails.
    async fn get_or_create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<EnrollmentHandle, Error>;

    /// Upsert one lesson's completion and return the full updated list.
    ///
    /// The progress cache entry for the learner and course is invalidated
    /// once the record is persisted. No retries are attempted.
    ///
    /// # Errors
    /// - `NotFound` when the course does not exist.
    /// - `InvalidRequest` when the position is outside the course.
    /// - `InternalError` when the store or cache fails.
    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> Result<UpdateProgressResponse, Error>;
}
