//! Process-local TTL cache for progress snapshots.
//!
//! Entries are keyed by `(user, course)` and carry the instant they were
//! captured. An entry whose age has reached the TTL is treated as a miss and
//! evicted on read, so expiry needs no background task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ProgressRecord;
use crate::domain::ports::{ProgressCache, ProgressCacheError, ProgressCacheKey};

struct CacheEntry {
    records: Vec<ProgressRecord>,
    captured_at: DateTime<Utc>,
}

/// In-memory [`ProgressCache`] with a fixed time-to-live.
pub struct InMemoryProgressCache {
    entries: Mutex<HashMap<ProgressCacheKey, CacheEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryProgressCache {
    /// Create a cache whose entries expire after `ttl`.
    ///
    /// # Errors
    /// Returns [`ProgressCacheError::Backend`] when `ttl` does not fit in a
    /// signed duration.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, ProgressCacheError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|err| ProgressCacheError::backend(format!("invalid cache ttl: {err}")))?;
        Ok(Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ProgressCacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProgressCache for InMemoryProgressCache {
    async fn get(
        &self,
        key: &ProgressCacheKey,
    ) -> Result<Option<Vec<ProgressRecord>>, ProgressCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries();
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if now - entry.captured_at >= self.ttl {
            entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.records.clone()))
    }

    async fn put(
        &self,
        key: &ProgressCacheKey,
        records: &[ProgressRecord],
    ) -> Result<(), ProgressCacheError> {
        let entry = CacheEntry {
            records: records.to_vec(),
            captured_at: self.clock.utc(),
        };
        self.entries().insert(key.clone(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &ProgressCacheKey) -> Result<(), ProgressCacheError> {
        self.entries().remove(key);
        Ok(())
    }
}
