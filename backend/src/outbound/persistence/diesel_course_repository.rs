//! PostgreSQL-backed `CourseRepository`.
//!
//! Courses are stored across three tables (courses, modules, lessons) and
//! reassembled in index order on read. Upserts replace the module and lesson
//! rows of an existing slug inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{count_star, now};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{CourseId, CourseStructure, CourseSummary, Lesson, Module};

use super::diesel_helpers::{index_from_db, index_to_db, map_diesel_error, map_pool_error};
use super::models::{CourseRow, LessonRow, ModuleRow, NewCourseRow};
use super::pool::DbPool;
use super::schema::{course_lessons, course_modules, courses};

/// Diesel implementation of [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn count_to_usize(count: i64) -> Result<usize, CourseRepositoryError> {
    usize::try_from(count).map_err(|_| CourseRepositoryError::mapping(format!("bad count {count}")))
}

fn counts_by_course(rows: Vec<(Uuid, i64)>) -> Result<HashMap<Uuid, usize>, CourseRepositoryError> {
    rows.into_iter()
        .map(|(course_id, count)| Ok((course_id, count_to_usize(count)?)))
        .collect()
}

/// Reassemble a course from rows already sorted by index.
///
/// Indices must be dense: a gap means the stored course is corrupt.
fn assemble_course(
    course: CourseRow,
    module_rows: Vec<ModuleRow>,
    lesson_rows: Vec<LessonRow>,
) -> Result<CourseStructure, CourseRepositoryError> {
    let mut modules: Vec<Module> = Vec::with_capacity(module_rows.len());
    for row in module_rows {
        let index = index_from_db(row.module_index).map_err(CourseRepositoryError::mapping)?;
        if usize::try_from(index).ok() != Some(modules.len()) {
            return Err(CourseRepositoryError::mapping(format!(
                "module index {index} out of sequence"
            )));
        }
        modules.push(Module {
            title: row.title,
            lessons: Vec::new(),
        });
    }

    for row in lesson_rows {
        let module_index =
            index_from_db(row.module_index).map_err(CourseRepositoryError::mapping)?;
        let lesson_index =
            index_from_db(row.lesson_index).map_err(CourseRepositoryError::mapping)?;
        let module = usize::try_from(module_index)
            .ok()
            .and_then(|idx| modules.get_mut(idx))
            .ok_or_else(|| {
                CourseRepositoryError::mapping(format!("lesson refers to module {module_index}"))
            })?;
        if usize::try_from(lesson_index).ok() != Some(module.lessons.len()) {
            return Err(CourseRepositoryError::mapping(format!(
                "lesson index {lesson_index} out of sequence in module {module_index}"
            )));
        }
        module.lessons.push(Lesson {
            title: row.title,
            video_id: row.video_id,
        });
    }

    Ok(CourseStructure {
        id: CourseId::from_uuid(course.id),
        slug: course.slug,
        title: course.title,
        description: course.description,
        modules,
    })
}

/// Flatten a course into module and lesson rows for `course_id`.
fn structure_rows(
    course_id: Uuid,
    course: &CourseStructure,
) -> Result<(Vec<ModuleRow>, Vec<LessonRow>), CourseRepositoryError> {
    let mut module_rows = Vec::with_capacity(course.modules.len());
    let mut lesson_rows = Vec::with_capacity(course.total_lessons());
    for (module, module_index) in course.modules.iter().zip(0_u32..) {
        let module_index = index_to_db(module_index).map_err(CourseRepositoryError::query)?;
        module_rows.push(ModuleRow {
            course_id,
            module_index,
            title: module.title.clone(),
        });
        for (lesson, lesson_index) in module.lessons.iter().zip(0_u32..) {
            lesson_rows.push(LessonRow {
                course_id,
                module_index,
                lesson_index: index_to_db(lesson_index).map_err(CourseRepositoryError::query)?,
                title: lesson.title.clone(),
                video_id: lesson.video_id.clone(),
            });
        }
    }
    Ok((module_rows, lesson_rows))
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .select(CourseRow::as_select())
            .order_by(courses::title)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let module_counts: Vec<(Uuid, i64)> = course_modules::table
            .group_by(course_modules::course_id)
            .select((course_modules::course_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let lesson_counts: Vec<(Uuid, i64)> = course_lessons::table
            .group_by(course_lessons::course_id)
            .select((course_lessons::course_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let module_counts = counts_by_course(module_counts)?;
        let lesson_counts = counts_by_course(lesson_counts)?;

        Ok(rows
            .into_iter()
            .map(|row| CourseSummary {
                id: CourseId::from_uuid(row.id),
                module_count: module_counts.get(&row.id).copied().unwrap_or_default(),
                lesson_count: lesson_counts.get(&row.id).copied().unwrap_or_default(),
                slug: row.slug,
                title: row.title,
                description: row.description,
            })
            .collect())
    }

    async fn find_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseStructure>, CourseRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let Some(course) = courses::table
            .filter(courses::id.eq(course_id.as_uuid()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let module_rows: Vec<ModuleRow> = course_modules::table
            .filter(course_modules::course_id.eq(course.id))
            .select(ModuleRow::as_select())
            .order_by(course_modules::module_index)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let lesson_rows: Vec<LessonRow> = course_lessons::table
            .filter(course_lessons::course_id.eq(course.id))
            .select(LessonRow::as_select())
            .order_by((course_lessons::module_index, course_lessons::lesson_index))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble_course(course, module_rows, lesson_rows).map(Some)
    }

    async fn upsert_course(
        &self,
        course: &CourseStructure,
    ) -> Result<CourseId, CourseRepositoryError> {
        let new_course = NewCourseRow {
            id: *course.id.as_uuid(),
            slug: &course.slug,
            title: &course.title,
            description: &course.description,
        };
        let (mut module_rows, mut lesson_rows) = structure_rows(*course.id.as_uuid(), course)?;
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let stored_id = conn
            .transaction(|conn| {
                async move {
                    let stored_id: Uuid = diesel::insert_into(courses::table)
                        .values(&new_course)
                        .on_conflict(courses::slug)
                        .do_update()
                        .set((
                            courses::title.eq(excluded(courses::title)),
                            courses::description.eq(excluded(courses::description)),
                            courses::updated_at.eq(now),
                        ))
                        .returning(courses::id)
                        .get_result(conn)
                        .await?;

                    // An existing slug keeps its id; rows must reference it.
                    for row in &mut module_rows {
                        row.course_id = stored_id;
                    }
                    for row in &mut lesson_rows {
                        row.course_id = stored_id;
                    }

                    diesel::delete(
                        course_modules::table.filter(course_modules::course_id.eq(stored_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(course_modules::table)
                        .values(&module_rows)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(course_lessons::table)
                        .values(&lesson_rows)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(stored_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(slug = %course.slug, course_id = %stored_id, "course upserted");
        Ok(CourseId::from_uuid(stored_id))
    }
}
