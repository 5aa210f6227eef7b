//! In-memory course catalogue.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{CourseId, CourseStructure, CourseSummary};

/// Course store keyed by slug.
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: Mutex<HashMap<String, CourseStructure>>,
}

impl InMemoryCourseRepository {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalogue holding `courses`.
    pub fn with_courses(courses: impl IntoIterator<Item = CourseStructure>) -> Self {
        let courses = courses
            .into_iter()
            .map(|course| (course.slug.clone(), course))
            .collect();
        Self {
            courses: Mutex::new(courses),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError> {
        let courses = lock(&self.courses);
        let mut summaries: Vec<_> = courses.values().map(CourseStructure::summary).collect();
        summaries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(summaries)
    }

    async fn find_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseStructure>, CourseRepositoryError> {
        let courses = lock(&self.courses);
        Ok(courses.values().find(|course| course.id == *course_id).cloned())
    }

    async fn upsert_course(
        &self,
        course: &CourseStructure,
    ) -> Result<CourseId, CourseRepositoryError> {
        let mut courses = lock(&self.courses);
        let id = courses
            .get(&course.slug)
            .map_or(course.id, |existing| existing.id);
        let mut stored = course.clone();
        stored.id = id;
        courses.insert(course.slug.clone(), stored);
        Ok(id)
    }
}
