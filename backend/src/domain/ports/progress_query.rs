//! Driving port for reading progress.

use async_trait::async_trait;

use crate::domain::{CourseId, EnrollmentOutcome, Error, ProgressRecord, ProgressSummary, UserId};

/// Whether a read was served from the progress cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a live cache entry.
    Hit,
    /// Read from the store and cached afterwards.
    Miss,
}

/// Identifies one learner's progress in one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRequest {
    /// Authenticated learner.
    pub user_id: UserId,
    /// Course being viewed.
    pub course_id: CourseId,
}

/// Raw progress records plus provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    /// Every record of the enrollment ordered by position.
    pub records: Vec<ProgressRecord>,
    /// Whether the cache answered.
    pub cache_status: CacheStatus,
    /// Whether this read created the enrollment. Cache hits report
    /// [`EnrollmentOutcome::Existing`].
    pub enrollment: EnrollmentOutcome,
}

/// Use-case port for progress reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressQuery: Send + Sync {
    /// Return the learner's progress records for a course.
    ///
    /// Enrolls the learner when no enrollment exists yet.
    ///
    /// # Errors
    /// - `NotFound` when the course does not exist.
    /// - `InternalError` when the store or cache fails.
    async fn get_progress(&self, request: ProgressRequest) -> Result<ProgressView, Error>;

    /// Return the aggregated dashboard summary for a course.
    async fn get_summary(&self, request: ProgressRequest) -> Result<ProgressSummary, Error>;
}
