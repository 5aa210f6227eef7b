//! Driving ports for lesson Q&A.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedUser, CommentId, CourseId, Error, LessonComment, LessonPosition,
};

/// Identifies one lesson of one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRef {
    /// Course containing the lesson.
    pub course_id: CourseId,
    /// Lesson address.
    pub position: LessonPosition,
}

/// New question or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCommentRequest {
    /// Authenticated author.
    pub author: AuthenticatedUser,
    /// Lesson being discussed.
    pub lesson: LessonRef,
    /// Raw text; trimmed and validated by the service.
    pub body: String,
    /// Question being answered, for replies.
    pub parent_id: Option<CommentId>,
}

/// Use-case port for reading lesson threads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonCommentsQuery: Send + Sync {
    /// Comments on a lesson, oldest first.
    ///
    /// # Errors
    /// `NotFound` when the course or lesson does not exist.
    async fn list_comments(&self, lesson: LessonRef) -> Result<Vec<LessonComment>, Error>;
}

/// Use-case port for posting to lesson threads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonCommentsCommand: Send + Sync {
    /// Post a question, or a reply when `parent_id` is set.
    ///
    /// # Errors
    /// - `InvalidRequest` for blank or overlong bodies.
    /// - `Forbidden` when a non-admin replies.
    /// - `NotFound` when the lesson or parent comment does not exist.
    async fn post_comment(&self, request: PostCommentRequest) -> Result<LessonComment, Error>;
}
