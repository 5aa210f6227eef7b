//! In-memory lesson comments.

use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{LessonCommentRepository, LessonCommentRepositoryError};
use crate::domain::{CommentId, CourseId, LessonComment, LessonPosition};

/// Append-only comment log.
#[derive(Default)]
pub struct InMemoryLessonCommentRepository {
    comments: Mutex<Vec<LessonComment>>,
}

impl InMemoryLessonCommentRepository {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LessonCommentRepository for InMemoryLessonCommentRepository {
    async fn insert(&self, comment: &LessonComment) -> Result<(), LessonCommentRepositoryError> {
        lock(&self.comments).push(comment.clone());
        Ok(())
    }

    async fn find(
        &self,
        id: &CommentId,
    ) -> Result<Option<LessonComment>, LessonCommentRepositoryError> {
        Ok(lock(&self.comments)
            .iter()
            .find(|comment| comment.id == *id)
            .cloned())
    }

    async fn list_for_lesson(
        &self,
        course_id: &CourseId,
        position: &LessonPosition,
    ) -> Result<Vec<LessonComment>, LessonCommentRepositoryError> {
        let mut matching: Vec<_> = lock(&self.comments)
            .iter()
            .filter(|comment| comment.course_id == *course_id && comment.position == *position)
            .cloned()
            .collect();
        matching.sort_by_key(|comment| comment.created_at);
        Ok(matching)
    }
}
