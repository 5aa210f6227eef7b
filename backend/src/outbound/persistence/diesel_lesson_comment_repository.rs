//! PostgreSQL-backed `LessonCommentRepository`.
//!
//! Author names and roles are joined from `users` at read time, so a renamed
//! account shows its current name on old comments.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LessonCommentRepository, LessonCommentRepositoryError};
use crate::domain::{
    CommentAuthor, CommentBody, CommentId, CourseId, DisplayName, LessonComment, LessonPosition,
    Role, UserId,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, position_from_db, position_to_db};
use super::models::LessonCommentRow;
use super::pool::DbPool;
use super::schema::{lesson_comments, users};

/// Diesel implementation of [`LessonCommentRepository`].
#[derive(Clone)]
pub struct DieselLessonCommentRepository {
    pool: DbPool,
}

impl DieselLessonCommentRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type CommentWithAuthor = (LessonCommentRow, (String, String));

fn mapping(err: impl ToString) -> LessonCommentRepositoryError {
    LessonCommentRepositoryError::mapping(err.to_string())
}

fn row_to_comment(
    (row, (display_name, role)): CommentWithAuthor,
) -> Result<LessonComment, LessonCommentRepositoryError> {
    Ok(LessonComment {
        id: CommentId::from_uuid(row.id),
        course_id: CourseId::from_uuid(row.course_id),
        position: position_from_db(row.module_index, row.lesson_index).map_err(mapping)?,
        author: CommentAuthor {
            user_id: UserId::from_uuid(row.author_id),
            display_name: DisplayName::new(display_name).map_err(mapping)?,
            role: role.parse::<Role>().map_err(mapping)?,
        },
        parent_id: row.parent_id.map(CommentId::from_uuid),
        body: CommentBody::new(row.body).map_err(mapping)?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl LessonCommentRepository for DieselLessonCommentRepository {
    async fn insert(&self, comment: &LessonComment) -> Result<(), LessonCommentRepositoryError> {
        let (module_index, lesson_index) =
            position_to_db(comment.position).map_err(LessonCommentRepositoryError::query)?;
        let row = LessonCommentRow {
            id: *comment.id.as_uuid(),
            course_id: *comment.course_id.as_uuid(),
            module_index,
            lesson_index,
            author_id: *comment.author.user_id.as_uuid(),
            parent_id: comment.parent_id.map(|id| *id.as_uuid()),
            body: comment.body.as_ref().to_owned(),
            created_at: comment.created_at,
        };
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        diesel::insert_into(lesson_comments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        id: &CommentId,
    ) -> Result<Option<LessonComment>, LessonCommentRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row: Option<CommentWithAuthor> = lesson_comments::table
            .inner_join(users::table)
            .filter(lesson_comments::id.eq(id.as_uuid()))
            .select((
                LessonCommentRow::as_select(),
                (users::display_name, users::role),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_comment).transpose()
    }

    async fn list_for_lesson(
        &self,
        course_id: &CourseId,
        position: &LessonPosition,
    ) -> Result<Vec<LessonComment>, LessonCommentRepositoryError> {
        let (module_index, lesson_index) =
            position_to_db(*position).map_err(LessonCommentRepositoryError::query)?;
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let rows: Vec<CommentWithAuthor> = lesson_comments::table
            .inner_join(users::table)
            .filter(lesson_comments::course_id.eq(course_id.as_uuid()))
            .filter(lesson_comments::module_index.eq(module_index))
            .filter(lesson_comments::lesson_index.eq(lesson_index))
            .select((
                LessonCommentRow::as_select(),
                (users::display_name, users::role),
            ))
            .order_by((lesson_comments::created_at, lesson_comments::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_comment).collect()
    }
}
