//! Shared helpers for Diesel repository implementations.
//!
//! Every port error in this crate has `Connection` and `Query` variants, so
//! pool and Diesel failures are mapped once here through
//! [`RepositoryErrorKind`] instead of per repository.

use tracing::debug;

use crate::domain::LessonPosition;
use crate::domain::ports::{
    AccessTokenRepositoryError, CourseRepositoryError, LessonCommentRepositoryError,
    ProgressRepositoryError, UserRepositoryError,
};

use super::pool::PoolError;

/// Port errors that distinguish connection failures from query failures.
pub(crate) trait RepositoryErrorKind {
    /// Connection could not be established or was lost.
    fn connection_failure(message: String) -> Self;
    /// Statement failed to execute.
    fn query_failure(message: String) -> Self;
}

macro_rules! impl_repository_error_kind {
    ($($error:ty),* $(,)?) => {
        $(
            impl RepositoryErrorKind for $error {
                fn connection_failure(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failure(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_repository_error_kind!(
    AccessTokenRepositoryError,
    CourseRepositoryError,
    LessonCommentRepositoryError,
    ProgressRepositoryError,
    UserRepositoryError,
);

/// Map pool errors to the repository's connection variant.
pub(crate) fn map_pool_error<E: RepositoryErrorKind>(error: PoolError) -> E {
    match error {
        PoolError::Unavailable { message } | PoolError::Setup { message } => {
            E::connection_failure(message)
        }
    }
}

/// Map Diesel errors to repository errors, logging the database detail.
///
/// Raw database messages stay in the debug log; the returned error carries a
/// generic description only.
pub(crate) fn map_diesel_error<E: RepositoryErrorKind>(error: diesel::result::Error) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query_failure("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failure("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failure("database connection error".to_owned())
        }
        _ => E::query_failure("database error".to_owned()),
    }
}

/// Convert a zero-based index to its `INTEGER` column value.
pub(crate) fn index_to_db(index: u32) -> Result<i32, String> {
    i32::try_from(index).map_err(|_| format!("index {index} exceeds the database range"))
}

/// Convert an `INTEGER` column value back to a zero-based index.
pub(crate) fn index_from_db(index: i32) -> Result<u32, String> {
    u32::try_from(index).map_err(|_| format!("negative index {index} in database"))
}

/// Convert a position to its `(module_index, lesson_index)` column values.
pub(crate) fn position_to_db(position: LessonPosition) -> Result<(i32, i32), String> {
    Ok((
        index_to_db(position.module_index)?,
        index_to_db(position.lesson_index)?,
    ))
}

/// Rebuild a position from its column values.
pub(crate) fn position_from_db(
    module_index: i32,
    lesson_index: i32,
) -> Result<LessonPosition, String> {
    Ok(LessonPosition::new(
        index_from_db(module_index)?,
        index_from_db(lesson_index)?,
    ))
}
