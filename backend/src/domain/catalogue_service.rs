//! Catalogue service implementing [`CatalogueQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{CatalogueQuery, CourseRepository, CourseRepositoryError};
use crate::domain::{CourseId, CourseStructure, CourseSummary, Error};

/// Read-only catalogue use-cases.
#[derive(Clone)]
pub struct CatalogueService<C> {
    course_repo: Arc<C>,
}

impl<C> CatalogueService<C> {
    /// Create a service over a course repository.
    pub fn new(course_repo: Arc<C>) -> Self {
        Self { course_repo }
    }
}

pub(crate) fn map_course_repository_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::internal(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } | CourseRepositoryError::Mapping { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

pub(crate) fn course_not_found(course_id: &CourseId) -> Error {
    Error::not_found("course not found").with_details(json!({
        "courseId": course_id.to_string(),
        "code": "course_not_found",
    }))
}

#[async_trait]
impl<C> CatalogueQuery for CatalogueService<C>
where
    C: CourseRepository,
{
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, Error> {
        self.course_repo
            .list_courses()
            .await
            .map_err(map_course_repository_error)
    }

    async fn get_course(&self, course_id: CourseId) -> Result<CourseStructure, Error> {
        self.course_repo
            .find_course(&course_id)
            .await
            .map_err(map_course_repository_error)?
            .ok_or_else(|| course_not_found(&course_id))
    }
}
