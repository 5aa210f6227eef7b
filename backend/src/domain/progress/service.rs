//! Progress service implementing the progress query and command ports.
//!
//! Reads go through the per-user cache; writes persist first, then
//! invalidate the cache entry so the next read sees the change.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use super::{ProgressRecord, ProgressSummary, aggregate};
use crate::domain::catalogue_service::{course_not_found, map_course_repository_error};
use crate::domain::ports::{
    CacheStatus, CourseRepository, EnrollmentHandle, ProgressCache,
    ProgressCacheError, ProgressCacheKey, ProgressCommand, ProgressQuery, ProgressRepository,
    ProgressRepositoryError, ProgressRequest, ProgressView, UpdateProgressRequest,
    UpdateProgressResponse,
};
use crate::domain::{
    CourseId, CourseStructure, Enrollment, EnrollmentOutcome, Error, UserId,
};

/// Progress use-cases over a progress store, the course catalogue and a
/// progress cache.
#[derive(Clone)]
pub struct ProgressService<P, C, K> {
    progress_repo: Arc<P>,
    course_repo: Arc<C>,
    cache: Arc<K>,
    clock: Arc<dyn Clock>,
}

impl<P, C, K> ProgressService<P, C, K> {
    /// Create a service from its collaborators.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use academy::domain::ProgressService;
    /// use academy::domain::ports::FixtureProgressCache;
    /// use academy::outbound::memory::{InMemoryCourseRepository, InMemoryProgressRepository};
    ///
    /// let service = ProgressService::new(
    ///     Arc::new(InMemoryProgressRepository::default()),
    ///     Arc::new(InMemoryCourseRepository::default()),
    ///     Arc::new(FixtureProgressCache),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        progress_repo: Arc<P>,
        course_repo: Arc<C>,
        cache: Arc<K>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            progress_repo,
            course_repo,
            cache,
            clock,
        }
    }
}

impl<P, C, K> ProgressService<P, C, K>
where
    P: ProgressRepository,
    C: CourseRepository,
    K: ProgressCache,
{
    fn map_progress_error(error: ProgressRepositoryError) -> Error {
        match error {
            ProgressRepositoryError::Connection { message } => {
                Error::internal(format!("progress repository unavailable: {message}"))
            }
            ProgressRepositoryError::Query { message } => {
                Error::internal(format!("progress repository error: {message}"))
            }
        }
    }

    fn map_cache_error(error: ProgressCacheError) -> Error {
        warn!(%error, "progress cache failure");
        Error::internal(format!("progress cache error: {error}"))
    }

    async fn load_course(&self, course_id: &CourseId) -> Result<CourseStructure, Error> {
        self.course_repo
            .find_course(course_id)
            .await
            .map_err(map_course_repository_error)?
            .ok_or_else(|| course_not_found(course_id))
    }

    /// Enrollment lookup that assumes the course has already been checked.
    async fn ensure_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentHandle, Error> {
        if let Some(enrollment) = self
            .progress_repo
            .find_enrollment(user_id, course_id)
            .await
            .map_err(Self::map_progress_error)?
        {
            return Ok(EnrollmentHandle {
                enrollment,
                outcome: EnrollmentOutcome::Existing,
            });
        }

        let candidate = Enrollment::new(user_id.clone(), *course_id, self.clock.utc());
        let stored = self
            .progress_repo
            .create_enrollment(&candidate)
            .await
            .map_err(Self::map_progress_error)?;
        // A concurrent request may have won the insert; its row is returned.
        let outcome = if stored.id == candidate.id {
            debug!(%user_id, %course_id, enrollment_id = %stored.id, "enrollment created");
            EnrollmentOutcome::Created
        } else {
            EnrollmentOutcome::Existing
        };
        Ok(EnrollmentHandle {
            enrollment: stored,
            outcome,
        })
    }

    async fn cached_records(
        &self,
        key: &ProgressCacheKey,
    ) -> Result<Option<Vec<ProgressRecord>>, Error> {
        let cached = self.cache.get(key).await.map_err(Self::map_cache_error)?;
        debug!(
            user_id = %key.user_id,
            course_id = %key.course_id,
            hit = cached.is_some(),
            "progress cache lookup"
        );
        Ok(cached)
    }

    /// Read records from the store and repopulate the cache.
    async fn fill_from_store(
        &self,
        key: &ProgressCacheKey,
    ) -> Result<(Vec<ProgressRecord>, EnrollmentOutcome), Error> {
        let handle = self.ensure_enrollment(&key.user_id, &key.course_id).await?;
        let records = self
            .progress_repo
            .list_records(&handle.enrollment.id)
            .await
            .map_err(Self::map_progress_error)?;
        self.cache
            .put(key, &records)
            .await
            .map_err(Self::map_cache_error)?;
        Ok((records, handle.outcome))
    }
}

#[async_trait]
impl<P, C, K> ProgressQuery for ProgressService<P, C, K>
where
    P: ProgressRepository,
    C: CourseRepository,
    K: ProgressCache,
{
    async fn get_progress(&self, request: ProgressRequest) -> Result<ProgressView, Error> {
        let key = ProgressCacheKey::new(request.user_id, request.course_id);
        if let Some(records) = self.cached_records(&key).await? {
            return Ok(ProgressView {
                records,
                cache_status: CacheStatus::Hit,
                enrollment: EnrollmentOutcome::Existing,
            });
        }

        self.load_course(&key.course_id).await?;
        let (records, enrollment) = self.fill_from_store(&key).await?;
        Ok(ProgressView {
            records,
            cache_status: CacheStatus::Miss,
            enrollment,
        })
    }

    async fn get_summary(&self, request: ProgressRequest) -> Result<ProgressSummary, Error> {
        let course = self.load_course(&request.course_id).await?;
        let key = ProgressCacheKey::new(request.user_id, request.course_id);
        let records = match self.cached_records(&key).await? {
            Some(records) => records,
            None => self.fill_from_store(&key).await?.0,
        };
        Ok(aggregate(&records, &course))
    }
}

#[async_trait]
impl<P, C, K> ProgressCommand for ProgressService<P, C, K>
where
    P: ProgressRepository,
    C: CourseRepository,
    K: ProgressCache,
{
    async fn get_or_create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<EnrollmentHandle, Error> {
        self.load_course(&course_id).await?;
        self.ensure_enrollment(&user_id, &course_id).await
    }

    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> Result<UpdateProgressResponse, Error> {
        let UpdateProgressRequest {
            user_id,
            course_id,
            position,
            completed,
        } = request;

        let course = self.load_course(&course_id).await?;
        if !course.contains(position) {
            return Err(
                Error::invalid_request("lesson position is outside the course").with_details(
                    json!({
                        "moduleIndex": position.module_index,
                        "lessonIndex": position.lesson_index,
                        "code": "lesson_out_of_range",
                    }),
                ),
            );
        }

        let handle = self.ensure_enrollment(&user_id, &course_id).await?;
        let enrollment_id = handle.enrollment.id;
        let existing = self
            .progress_repo
            .find_record(&enrollment_id, &position)
            .await
            .map_err(Self::map_progress_error)?;
        let record = ProgressRecord::toggled(
            existing.as_ref(),
            enrollment_id,
            position,
            completed,
            self.clock.utc(),
        );
        self.progress_repo
            .upsert_record(&record)
            .await
            .map_err(Self::map_progress_error)?;

        let key = ProgressCacheKey::new(user_id, course_id);
        self.cache
            .invalidate(&key)
            .await
            .map_err(Self::map_cache_error)?;
        debug!(
            user_id = %key.user_id,
            course_id = %key.course_id,
            %position,
            completed,
            "progress updated"
        );

        let records = self
            .progress_repo
            .list_records(&enrollment_id)
            .await
            .map_err(Self::map_progress_error)?;
        Ok(UpdateProgressResponse {
            records,
            enrollment: handle.outcome,
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
