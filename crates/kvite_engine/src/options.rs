//! Engine location and connection options.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where an engine keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A database file on disk.
    File(PathBuf),
    /// A private scratch database.
    ///
    /// Backed by a file in a temporary directory named after the location,
    /// in write-ahead-log mode, so pooled connections see the last commit
    /// while a writer is open. The data is deleted when the engine is dropped.
    Memory(String),
}

impl Location {
    /// Creates a file location.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Creates a fresh, uniquely named memory location.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(format!("kvite-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns true for memory locations.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory(name) => write!(f, ":memory:{name}"),
        }
    }
}

/// How `BEGIN` acquires locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeginMode {
    /// Locks are taken lazily on first read or write.
    #[default]
    Deferred,
    /// A write lock is taken immediately.
    Immediate,
    /// An exclusive lock is taken immediately.
    Exclusive,
}

impl BeginMode {
    pub(crate) const fn statement(self) -> &'static str {
        match self {
            Self::Deferred => "BEGIN DEFERRED",
            Self::Immediate => "BEGIN IMMEDIATE",
            Self::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// Options applied when opening an engine and each of its connections.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Create the database file (and parent directories) if missing.
    pub create_if_missing: bool,

    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Put file databases in write-ahead-log journal mode. Memory
    /// locations always use it.
    pub wal: bool,

    /// Maximum number of pooled connections.
    pub max_connections: u32,

    /// How long `connect` waits for a free pooled connection.
    pub connection_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            wal: true,
            max_connections: 4,
            connection_timeout: Duration::from_secs(30),
        }
    }
}
