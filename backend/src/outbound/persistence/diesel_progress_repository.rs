//! PostgreSQL-backed `ProgressRepository`.
//!
//! Uniqueness of enrollments and progress records is enforced by database
//! constraints; both writes are single `INSERT ... ON CONFLICT` statements.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProgressRepository, ProgressRepositoryError};
use crate::domain::{
    CourseId, Enrollment, EnrollmentId, LessonPosition, ProgressRecord, UserId,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, position_from_db, position_to_db};
use super::models::{EnrollmentRow, ProgressRecordRow};
use super::pool::DbPool;
use super::schema::{enrollments, progress_records};

/// Diesel implementation of [`ProgressRepository`].
#[derive(Clone)]
pub struct DieselProgressRepository {
    pool: DbPool,
}

impl DieselProgressRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_enrollment(row: EnrollmentRow) -> Enrollment {
    Enrollment {
        id: EnrollmentId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        course_id: CourseId::from_uuid(row.course_id),
        created_at: row.created_at,
    }
}

fn row_to_record(row: ProgressRecordRow) -> Result<ProgressRecord, ProgressRepositoryError> {
    let position = position_from_db(row.module_index, row.lesson_index)
        .map_err(ProgressRepositoryError::query)?;
    Ok(ProgressRecord {
        enrollment_id: EnrollmentId::from_uuid(row.enrollment_id),
        position,
        completed: row.completed,
        completed_at: row.completed_at,
        updated_at: row.updated_at,
    })
}

fn position_columns(position: LessonPosition) -> Result<(i32, i32), ProgressRepositoryError> {
    position_to_db(position).map_err(ProgressRepositoryError::query)
}

#[async_trait]
impl ProgressRepository for DieselProgressRepository {
    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, ProgressRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .filter(enrollments::course_id.eq(course_id.as_uuid()))
            .select(EnrollmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_enrollment))
    }

    async fn create_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, ProgressRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let new_row = EnrollmentRow {
            id: *enrollment.id.as_uuid(),
            user_id: *enrollment.user_id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            created_at: enrollment.created_at,
        };
        diesel::insert_into(enrollments::table)
            .values(&new_row)
            .on_conflict((enrollments::user_id, enrollments::course_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // A concurrent request may have won the insert; return the stored row.
        let stored = enrollments::table
            .filter(enrollments::user_id.eq(new_row.user_id))
            .filter(enrollments::course_id.eq(new_row.course_id))
            .select(EnrollmentRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_enrollment(stored))
    }

    async fn list_records(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let rows: Vec<ProgressRecordRow> = progress_records::table
            .filter(progress_records::enrollment_id.eq(enrollment_id.as_uuid()))
            .select(ProgressRecordRow::as_select())
            .order_by((progress_records::module_index, progress_records::lesson_index))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn find_record(
        &self,
        enrollment_id: &EnrollmentId,
        position: &LessonPosition,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        let (module_index, lesson_index) = position_columns(*position)?;
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = progress_records::table
            .filter(progress_records::enrollment_id.eq(enrollment_id.as_uuid()))
            .filter(progress_records::module_index.eq(module_index))
            .filter(progress_records::lesson_index.eq(lesson_index))
            .select(ProgressRecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<(), ProgressRepositoryError> {
        let (module_index, lesson_index) = position_columns(record.position)?;
        let row = ProgressRecordRow {
            enrollment_id: *record.enrollment_id.as_uuid(),
            module_index,
            lesson_index,
            completed: record.completed,
            completed_at: record.completed_at,
            updated_at: record.updated_at,
        };
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        diesel::insert_into(progress_records::table)
            .values(&row)
            .on_conflict((
                progress_records::enrollment_id,
                progress_records::module_index,
                progress_records::lesson_index,
            ))
            .do_update()
            .set((
                progress_records::completed.eq(excluded(progress_records::completed)),
                progress_records::completed_at.eq(excluded(progress_records::completed_at)),
                progress_records::updated_at.eq(excluded(progress_records::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
