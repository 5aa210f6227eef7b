//! In-memory enrollments and progress records.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{ProgressRepository, ProgressRepositoryError};
use crate::domain::{CourseId, Enrollment, EnrollmentId, LessonPosition, ProgressRecord, UserId};

#[derive(Default)]
struct State {
    enrollments: HashMap<(UserId, CourseId), Enrollment>,
    records: HashMap<EnrollmentId, BTreeMap<LessonPosition, ProgressRecord>>,
}

/// Progress store keyed exactly like the relational schema.
///
/// Records are held in a map per enrollment keyed by position, so an upsert
/// can never produce a second record for the same lesson.
#[derive(Default)]
pub struct InMemoryProgressRepository {
    state: Mutex<State>,
}

impl InMemoryProgressRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, ProgressRepositoryError> {
        let state = lock(&self.state);
        Ok(state
            .enrollments
            .get(&(user_id.clone(), *course_id))
            .cloned())
    }

    async fn create_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, ProgressRepositoryError> {
        let mut state = lock(&self.state);
        let stored = state
            .enrollments
            .entry((enrollment.user_id.clone(), enrollment.course_id))
            .or_insert_with(|| enrollment.clone())
            .clone();
        Ok(stored)
    }

    async fn list_records(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        let state = lock(&self.state);
        Ok(state
            .records
            .get(enrollment_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_record(
        &self,
        enrollment_id: &EnrollmentId,
        position: &LessonPosition,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        let state = lock(&self.state);
        Ok(state
            .records
            .get(enrollment_id)
            .and_then(|records| records.get(position))
            .cloned())
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<(), ProgressRepositoryError> {
        let mut state = lock(&self.state);
        state
            .records
            .entry(record.enrollment_id)
            .or_default()
            .insert(record.position, record.clone());
        Ok(())
    }
}
