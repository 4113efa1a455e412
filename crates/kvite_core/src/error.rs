//! Error types for KVite core.

use kvite_engine::EngineError;
use thiserror::Error;

/// Result type for core operations.
pub type KvResult<T> = Result<T, KvError>;

/// Broad classification of a [`KvError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be opened or bootstrapped.
    Connection,
    /// A statement or transaction primitive failed.
    Engine,
    /// The call is not allowed in the current state.
    IllegalState,
    /// An argument was rejected before reaching the engine.
    InvalidArgument,
}

/// Errors that can occur in KVite core operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// Engine error while running a statement or transaction primitive.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine could not be opened.
    #[error("cannot open database at {location}: {source}")]
    Connection {
        /// Where the database was being opened.
        location: String,
        /// The underlying engine error.
        #[source]
        source: EngineError,
    },

    /// Creating the backing table or its index failed.
    #[error("schema bootstrap failed for table {table}: {source}")]
    Bootstrap {
        /// The backing table.
        table: String,
        /// The underlying engine error.
        #[source]
        source: EngineError,
    },

    /// Operation not permitted in the current state.
    #[error("illegal state: {message}")]
    IllegalState {
        /// Why the operation is not permitted.
        message: String,
    },

    /// The bucket already exists.
    #[error("bucket already exists: {name}")]
    BucketExists {
        /// Name of the bucket.
        name: String,
    },

    /// The bucket has not been created in this namespace.
    #[error("bucket not found: {name}")]
    BucketNotFound {
        /// Name of the bucket.
        name: String,
    },

    /// The transaction has already been committed or rolled back.
    #[error("transaction already finished")]
    TransactionFinished,

    /// Database is closed.
    #[error("database is closed")]
    DatabaseClosed,

    /// A name that would be interpolated as an SQL identifier was rejected.
    #[error("invalid identifier {name:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A bucket name was rejected.
    #[error("invalid bucket name {name:?}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
    },

    /// A key was rejected.
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl KvError {
    /// Creates a connection error.
    pub fn connection(location: impl ToString, source: EngineError) -> Self {
        Self::Connection {
            location: location.to_string(),
            source,
        }
    }

    /// Creates a bootstrap error.
    pub fn bootstrap(table: impl Into<String>, source: EngineError) -> Self {
        Self::Bootstrap {
            table: table.into(),
            source,
        }
    }

    /// Creates an illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Creates a bucket exists error.
    pub fn bucket_exists(name: impl Into<String>) -> Self {
        Self::BucketExists { name: name.into() }
    }

    /// Creates an invalid identifier error.
    pub fn invalid_identifier(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason,
        }
    }

    /// Returns the taxonomy this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } | Self::Bootstrap { .. } => ErrorKind::Connection,
            Self::Engine(_)
            | Self::BucketNotFound { .. }
            | Self::TransactionFinished
            | Self::DatabaseClosed => ErrorKind::Engine,
            Self::IllegalState { .. } | Self::BucketExists { .. } => ErrorKind::IllegalState,
            Self::InvalidIdentifier { .. }
            | Self::InvalidBucketName { .. }
            | Self::InvalidKey { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Returns true if this is an illegal state error.
    #[must_use]
    pub fn is_illegal_state(&self) -> bool {
        self.kind() == ErrorKind::IllegalState
    }
}
