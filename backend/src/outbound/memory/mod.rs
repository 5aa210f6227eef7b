//! Process-local repositories for running without PostgreSQL.
//!
//! The server falls back to these adapters when no database URL is
//! configured, and behaviour tests drive the real services through them.
//! State lives for the lifetime of the process.

mod accounts;
mod catalogue;
mod comments;
mod progress;

pub use accounts::{InMemoryAccessTokenRepository, InMemoryUserRepository};
pub use catalogue::InMemoryCourseRepository;
pub use comments::InMemoryLessonCommentRepository;
pub use progress::InMemoryProgressRepository;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Every mutation below replaces whole values, so a poisoned map is still
/// consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
