//! Port for the per-user progress cache.
//!
//! The cache is a latency optimisation in front of the progress store. It is
//! never the source of truth: a miss always falls through to the store, and
//! writers invalidate the affected key once their change is persisted.
//!
//! Entries are process-local. A read that misses, races with a concurrent
//! write, and repopulates after the writer's invalidation can leave a stale
//! snapshot in place until the entry expires. That window is bounded by the
//! TTL and accepted.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CourseId, ProgressRecord, UserId};

use super::define_port_error;

/// Default lifetime of a cached progress snapshot.
pub const DEFAULT_PROGRESS_CACHE_TTL: Duration = Duration::from_secs(30);

define_port_error! {
    /// Errors surfaced by progress cache adapters.
    pub enum ProgressCacheError {
        /// Cache backend is unavailable.
        Backend { message: String } => "progress cache backend failure: {message}",
    }
}

/// Cache key: one entry per user per course.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressCacheKey {
    /// Learner owning the progress.
    pub user_id: UserId,
    /// Course the progress belongs to.
    pub course_id: CourseId,
}

impl ProgressCacheKey {
    /// Build a key for `(user_id, course_id)`.
    pub fn new(user_id: UserId, course_id: CourseId) -> Self {
        Self { user_id, course_id }
    }
}

/// Port for caching progress snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCache: Send + Sync {
    /// Return the cached snapshot, or `None` when absent or expired.
    async fn get(
        &self,
        key: &ProgressCacheKey,
    ) -> Result<Option<Vec<ProgressRecord>>, ProgressCacheError>;

    /// Store a snapshot, replacing any previous entry for the key.
    async fn put(
        &self,
        key: &ProgressCacheKey,
        records: &[ProgressRecord],
    ) -> Result<(), ProgressCacheError>;

    /// Drop the entry for the key so the next read hits the store.
    async fn invalidate(&self, key: &ProgressCacheKey) -> Result<(), ProgressCacheError>;
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressCache;

#[async_trait]
impl ProgressCache for FixtureProgressCache {
    async fn get(
        &self,
        _key: &ProgressCacheKey,
    ) -> Result<Option<Vec<ProgressRecord>>, ProgressCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &ProgressCacheKey,
        _records: &[ProgressRecord],
    ) -> Result<(), ProgressCacheError> {
        Ok(())
    }

    async fn invalidate(&self, _key: &ProgressCacheKey) -> Result<(), ProgressCacheError> {
        Ok(())
    }
}
