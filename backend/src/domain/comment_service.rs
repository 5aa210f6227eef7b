//! Lesson Q&A service.
//!
//! Any authenticated user may ask a question on a lesson. Replies are
//! reserved for admins and must target a comment on the same lesson.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::catalogue_service::{course_not_found, map_course_repository_error};
use crate::domain::ports::{
    CourseRepository, LessonCommentRepository, LessonCommentRepositoryError,
    LessonCommentsCommand, LessonCommentsQuery, LessonRef, PostCommentRequest, UserRepository,
};
use crate::domain::{
    CommentAuthor, CommentBody, CommentId, Error, LessonComment, UserId,
};

/// Lesson comment use-cases.
#[derive(Clone)]
pub struct LessonCommentService<M, C, U> {
    comments: Arc<M>,
    courses: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<M, C, U> LessonCommentService<M, C, U> {
    /// Create a service from its repositories.
    pub fn new(comments: Arc<M>, courses: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            courses,
            users,
            clock,
        }
    }
}

fn map_comment_error(error: LessonCommentRepositoryError) -> Error {
    Error::internal(format!("comment repository error: {error}"))
}

impl<M, C, U> LessonCommentService<M, C, U>
where
    M: LessonCommentRepository,
    C: CourseRepository,
    U: UserRepository,
{
    async fn ensure_lesson_exists(&self, lesson: &LessonRef) -> Result<(), Error> {
        let course = self
            .courses
            .find_course(&lesson.course_id)
            .await
            .map_err(map_course_repository_error)?
            .ok_or_else(|| course_not_found(&lesson.course_id))?;
        if course.contains(lesson.position) {
            Ok(())
        } else {
            Err(Error::not_found("lesson not found").with_details(json!({
                "moduleIndex": lesson.position.module_index,
                "lessonIndex": lesson.position.lesson_index,
                "code": "lesson_not_found",
            })))
        }
    }

    async fn load_author(&self, user_id: &UserId) -> Result<CommentAuthor, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|err| Error::internal(format!("user repository error: {err}")))?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        Ok(CommentAuthor {
            user_id: user.id().clone(),
            display_name: user.display_name().clone(),
            role: user.role(),
        })
    }

    async fn ensure_parent(&self, parent_id: &CommentId, lesson: &LessonRef) -> Result<(), Error> {
        let parent = self
            .comments
            .find(parent_id)
            .await
            .map_err(map_comment_error)?;
        match parent {
            Some(parent)
                if parent.course_id == lesson.course_id && parent.position == lesson.position =>
            {
                Ok(())
            }
            _ => Err(Error::not_found("parent comment not found").with_details(json!({
                "parentId": parent_id.to_string(),
                "code": "parent_not_found",
            }))),
        }
    }
}

#[async_trait]
impl<M, C, U> LessonCommentsQuery for LessonCommentService<M, C, U>
where
    M: LessonCommentRepository,
    C: CourseRepository,
    U: UserRepository,
{
    async fn list_comments(&self, lesson: LessonRef) -> Result<Vec<LessonComment>, Error> {
        self.ensure_lesson_exists(&lesson).await?;
        self.comments
            .list_for_lesson(&lesson.course_id, &lesson.position)
            .await
            .map_err(map_comment_error)
    }
}

#[async_trait]
impl<M, C, U> LessonCommentsCommand for LessonCommentService<M, C, U>
where
    M: LessonCommentRepository,
    C: CourseRepository,
    U: UserRepository,
{
    async fn post_comment(&self, request: PostCommentRequest) -> Result<LessonComment, Error> {
        let PostCommentRequest {
            author,
            lesson,
            body,
            parent_id,
        } = request;
        let body = CommentBody::new(body).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "body", "code": "invalid_body" }))
        })?;
        if parent_id.is_some() && !author.role.is_admin() {
            return Err(Error::forbidden("only admins may reply to questions"));
        }

        self.ensure_lesson_exists(&lesson).await?;
        if let Some(parent_id) = parent_id.as_ref() {
            self.ensure_parent(parent_id, &lesson).await?;
        }

        let comment = LessonComment {
            id: CommentId::random(),
            course_id: lesson.course_id,
            position: lesson.position,
            author: self.load_author(&author.user_id).await?,
            parent_id,
            body,
            created_at: self.clock.utc(),
        };
        self.comments
            .insert(&comment)
            .await
            .map_err(map_comment_error)?;
        debug!(
            comment_id = %comment.id,
            course_id = %comment.course_id,
            position = %comment.position,
            reply = comment.parent_id.is_some(),
            "lesson comment posted"
        );
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "comment_service_tests.rs"]
mod comment_service_tests;
