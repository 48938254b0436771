//! Error types for the record store.

use thiserror::Error;

/// Record store result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Record store errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection, query, transaction, pool timeout)
    #[error("Database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    /// IO error (creating the store's parent directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store was closed before the operation ran
    #[error("Record store is closed")]
    Closed,

    /// Stored data violates an invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => DbError::Closed,
            other => DbError::Sqlx(other),
        }
    }
}

impl DbError {
    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
