//! Error types for engine operations.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by the storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// SQLite rejected a statement or transaction primitive.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No pooled connection became available.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// An I/O error occurred while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// Returns the SQLite result code, if this error came from SQLite.
    #[must_use]
    pub fn sqlite_code(&self) -> Option<rusqlite::ErrorCode> {
        match self {
            Self::Sqlite(err) => err.sqlite_error_code(),
            _ => None,
        }
    }

    /// Returns true if SQLite reported the database as busy or locked.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self.sqlite_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}
