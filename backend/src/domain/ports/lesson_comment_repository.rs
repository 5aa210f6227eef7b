//! Port for lesson Q&A persistence.

use async_trait::async_trait;

use crate::domain::{CommentId, CourseId, LessonComment, LessonPosition};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lesson comment repository adapters.
    pub enum LessonCommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
        /// Stored data could not be mapped into the domain model.
        Mapping { message: String } => "comment repository returned invalid data: {message}",
    }
}

/// Append-only storage for lesson comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonCommentRepository: Send + Sync {
    /// Persist a new comment.
    async fn insert(&self, comment: &LessonComment) -> Result<(), LessonCommentRepositoryError>;

    /// Fetch a comment by id.
    async fn find(
        &self,
        id: &CommentId,
    ) -> Result<Option<LessonComment>, LessonCommentRepositoryError>;

    /// Comments on one lesson, oldest first.
    async fn list_for_lesson(
        &self,
        course_id: &CourseId,
        position: &LessonPosition,
    ) -> Result<Vec<LessonComment>, LessonCommentRepositoryError>;
}
