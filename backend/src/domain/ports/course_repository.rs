//! Port for reading and loading the course catalogue.

use async_trait::async_trait;

use crate::domain::{CourseId, CourseStructure, CourseSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// Stored data could not be mapped into the domain model.
        Mapping { message: String } => "course repository returned invalid data: {message}",
    }
}

/// Read access to course structures plus the upsert used by seeding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Summaries of every course ordered by title.
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError>;

    /// Full structure of one course, modules and lessons in order.
    async fn find_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseStructure>, CourseRepositoryError>;

    /// Insert or replace a course keyed by slug, returning the stored id.
    ///
    /// Re-running with the same structure is a no-op apart from timestamps.
    async fn upsert_course(&self, course: &CourseStructure)
    -> Result<CourseId, CourseRepositoryError>;
}
