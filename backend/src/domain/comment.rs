//! Lesson comments: questions from learners and replies from staff.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CourseId, DisplayName, LessonPosition, Role, UserId};

/// Maximum comment length in characters after trimming.
pub const COMMENT_BODY_MAX: usize = 2000;

/// Stable comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CommentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Validation errors for comment bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentBodyError {
    /// Body was blank once trimmed.
    Empty,
    /// Body exceeded [`COMMENT_BODY_MAX`] characters.
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

impl fmt::Display for CommentBodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "comment body must not be empty"),
            Self::TooLong { max } => write!(f, "comment body must be at most {max} characters"),
        }
    }
}

impl std::error::Error for CommentBodyError {}

/// Trimmed, length-checked comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommentBodyError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentBodyError::Empty);
        }
        if trimmed.chars().count() > COMMENT_BODY_MAX {
            return Err(CommentBodyError::TooLong {
                max: COMMENT_BODY_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentBody {
    type Error = CommentBodyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Author snapshot shown next to a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    /// Author account.
    pub user_id: UserId,
    /// Name at the time of reading.
    pub display_name: DisplayName,
    /// Role at the time of reading.
    pub role: Role,
}

/// A question or reply attached to one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonComment {
    /// Comment identifier.
    pub id: CommentId,
    /// Course containing the lesson.
    pub course_id: CourseId,
    /// Lesson the comment is attached to.
    pub position: LessonPosition,
    /// Who wrote it.
    pub author: CommentAuthor,
    /// Question being answered, for replies.
    pub parent_id: Option<CommentId>,
    /// Text.
    pub body: CommentBody,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}
