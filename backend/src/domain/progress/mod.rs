//! Lesson progress: records, aggregation and the progress service.
//!
//! A [`ProgressRecord`] is a single completion fact for one lesson position
//! within an enrollment. Records are upserted, never deleted, and there is at
//! most one per `(enrollment, module_index, lesson_index)`.

mod aggregate;
mod service;

pub use aggregate::{ModuleProgress, ProgressSummary, ResumeLesson, ResumeReason, aggregate};
pub use service::ProgressService;

use chrono::{DateTime, Utc};

use super::{EnrollmentId, LessonPosition};

/// Completion state of one lesson for one enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    /// Owning enrollment.
    pub enrollment_id: EnrollmentId,
    /// Lesson the record refers to.
    pub position: LessonPosition,
    /// Whether the lesson is marked complete.
    pub completed: bool,
    /// When the lesson was marked complete; `None` while incomplete.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last time the record was written.
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Compute the record produced by toggling `position` to `completed`.
    ///
    /// `existing` is the stored record for the same key, if any. Marking an
    /// already-complete lesson complete keeps the original `completed_at`;
    /// marking a lesson incomplete clears it.
    ///
    /// # Examples
    /// ```
    /// use academy::domain::{EnrollmentId, LessonPosition, ProgressRecord};
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let done = ProgressRecord::toggled(None, EnrollmentId::random(), LessonPosition::FIRST, true, now);
    /// assert_eq!(done.completed_at, Some(now));
    /// let undone = ProgressRecord::toggled(Some(&done), done.enrollment_id, done.position, false, now);
    /// assert_eq!(undone.completed_at, None);
    /// ```
    pub fn toggled(
        existing: Option<&Self>,
        enrollment_id: EnrollmentId,
        position: LessonPosition,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let completed_at = match (completed, existing) {
            (false, _) => None,
            (true, Some(previous)) if previous.completed => previous.completed_at.or(Some(now)),
            (true, _) => Some(now),
        };
        Self {
            enrollment_id,
            position,
            completed,
            completed_at,
            updated_at: now,
        }
    }
}
