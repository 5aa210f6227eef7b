//! Builders wiring repositories into services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use academy::domain::ports::{
    AccessTokenRepository, CourseRepository, LessonCommentRepository, ProgressRepository,
    UserRepository,
};
use academy::domain::{
    AuthService, CatalogueSeeder, CatalogueService, LessonCommentService, ProgressService,
};
use academy::inbound::http::health::StorageMode;
use academy::inbound::http::state::HttpState;
use academy::outbound::cache::InMemoryProgressCache;
use academy::outbound::memory::{
    InMemoryAccessTokenRepository, InMemoryCourseRepository, InMemoryLessonCommentRepository,
    InMemoryProgressRepository, InMemoryUserRepository,
};
use academy::outbound::persistence::{
    DieselAccessTokenRepository, DieselCourseRepository, DieselLessonCommentRepository,
    DieselProgressRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repository set backing one process.
struct Repositories<C, U, T, P, M> {
    courses: Arc<C>,
    users: Arc<U>,
    tokens: Arc<T>,
    progress: Arc<P>,
    comments: Arc<M>,
}

/// Seed the store when a document is configured, then build every service
/// over the repositories.
async fn build_services<C, U, T, P, M>(
    repos: Repositories<C, U, T, P, M>,
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<HttpState>
where
    C: CourseRepository + 'static,
    U: UserRepository + 'static,
    T: AccessTokenRepository + 'static,
    P: ProgressRepository + 'static,
    M: LessonCommentRepository + 'static,
{
    let Repositories {
        courses,
        users,
        tokens,
        progress,
        comments,
    } = repos;

    if let Some(seed) = &config.seed {
        let outcome = CatalogueSeeder::new(Arc::clone(&courses), Arc::clone(&users))
            .apply(seed)
            .await
            .map_err(|err| std::io::Error::other(format!("startup seeding failed: {err}")))?;
        info!(courses = outcome.courses, users = outcome.users, "startup seed applied");
    }

    let cache = InMemoryProgressCache::new(config.progress_cache_ttl, Arc::clone(&clock))
        .map_err(|err| std::io::Error::other(format!("progress cache: {err}")))?;
    let auth = Arc::new(AuthService::new(
        Arc::clone(&users),
        tokens,
        Arc::clone(&clock),
        config.token_ttl,
    ));
    let progress = Arc::new(ProgressService::new(
        progress,
        Arc::clone(&courses),
        Arc::new(cache),
        Arc::clone(&clock),
    ));
    let comments = Arc::new(LessonCommentService::new(
        comments,
        Arc::clone(&courses),
        users,
        clock,
    ));

    Ok(HttpState {
        login: auth.clone(),
        tokens: auth,
        catalogue: Arc::new(CatalogueService::new(courses)),
        progress: progress.clone(),
        progress_command: progress,
        comments: comments.clone(),
        comments_command: comments,
    })
}

/// Build the shared HTTP state, choosing Diesel repositories when a pool is
/// configured and in-memory repositories otherwise.
pub(super) async fn build_http_state(
    config: &ServerConfig,
) -> std::io::Result<(web::Data<HttpState>, StorageMode)> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (state, mode) = match &config.db_pool {
        Some(pool) => {
            let repos = Repositories {
                courses: Arc::new(DieselCourseRepository::new(pool.clone())),
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                tokens: Arc::new(DieselAccessTokenRepository::new(pool.clone())),
                progress: Arc::new(DieselProgressRepository::new(pool.clone())),
                comments: Arc::new(DieselLessonCommentRepository::new(pool.clone())),
            };
            (build_services(repos, config, clock).await?, StorageMode::Postgres)
        }
        None => {
            let repos = Repositories {
                courses: Arc::new(InMemoryCourseRepository::new()),
                users: Arc::new(InMemoryUserRepository::new()),
                tokens: Arc::new(InMemoryAccessTokenRepository::new()),
                progress: Arc::new(InMemoryProgressRepository::new()),
                comments: Arc::new(InMemoryLessonCommentRepository::new()),
            };
            (build_services(repos, config, clock).await?, StorageMode::Memory)
        }
    };
    info!(storage = ?mode, "HTTP state built");
    Ok((web::Data::new(state), mode))
}
