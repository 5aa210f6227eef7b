//! Enrollment of a user in a course.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CourseId, UserId};

/// Stable enrollment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(Uuid);

impl EnrollmentId {
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

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Association of one user with one course.
///
/// ## Invariants
/// - At most one enrollment exists per `(user_id, course_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    /// Enrollment identifier owning the progress records.
    pub id: EnrollmentId,
    /// Enrolled user.
    pub user_id: UserId,
    /// Course the user is enrolled in.
    pub course_id: CourseId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Build a fresh enrollment stamped at `now`.
    pub fn new(user_id: UserId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            id: EnrollmentId::random(),
            user_id,
            course_id,
            created_at: now,
        }
    }
}

/// Whether `get_or_create_enrollment` found or created the enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentOutcome {
    /// The user was already enrolled.
    Existing,
    /// The enrollment was created by this call and has no progress yet.
    Created,
}
