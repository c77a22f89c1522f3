use gigboard_core::error::CoreError;

/// Error type for transactional repository operations.
///
/// Rule violations surface as [`DbError::Core`]; anything the database
/// itself reports stays a [`sqlx::Error`].
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            DbError::Core(err) => Some(err),
            DbError::Sqlx(_) => None,
        }
    }
}

/// Map a unique-constraint violation to `Conflict`. Concurrent inserts that
/// lose a race on a uniqueness rule end up here.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Core(CoreError::conflict(message))
        }
        _ => DbError::Sqlx(err),
    }
}

/// Decode a status id read from a row, treating unknown ids as corrupt data.
pub(crate) fn decode_status<T>(
    id: gigboard_core::status::StatusId,
    parse: fn(gigboard_core::status::StatusId) -> Option<T>,
    what: &str,
) -> Result<T, CoreError> {
    parse(id).ok_or_else(|| CoreError::Internal(format!("Unknown {what} status id {id}")))
}
