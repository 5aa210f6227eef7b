//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types; no business logic lives here. Rows (`models.rs`) and table
//! definitions (`schema.rs`) stay private to this module. Connections come
//! from a `bb8` pool through `diesel-async`; only migrations use a blocking
//! connection.
//!
//! # Example
//!
//! ```ignore
//! use academy::outbound::persistence::{DbPool, DieselProgressRepository, PoolConfig};
//!
//! let pool = DbPool::connect(PoolConfig::new("postgres://localhost/academy")).await?;
//! let progress = DieselProgressRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_course_repository;
mod diesel_lesson_comment_repository;
mod diesel_progress_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_lesson_comment_repository::DieselLessonCommentRepository;
pub use diesel_progress_repository::DieselProgressRepository;
pub use diesel_user_repository::{DieselAccessTokenRepository, DieselUserRepository};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
