//! Driving port for browsing the course catalogue.

use async_trait::async_trait;

use crate::domain::{CourseId, CourseStructure, CourseSummary, Error};

/// Use-case port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Every course ordered by title.
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, Error>;

    /// Full structure of one course; `NotFound` when absent.
    async fn get_course(&self, course_id: CourseId) -> Result<CourseStructure, Error>;
}
