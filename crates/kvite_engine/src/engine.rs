//! Engine handle: a pool of SQLite connections for one database.

use crate::connection::EngineConnection;
use crate::error::EngineResult;
use crate::options::{EngineOptions, Location};
use r2d2::{ManageConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// File name of the scratch database inside its temporary directory.
const SCRATCH_FILE: &str = "scratch.db";

/// A SQLite database reachable through a connection pool.
///
/// `Engine` is cheap to share by reference across threads. Each call to
/// [`Engine::connect`] checks out a connection that stays with the caller
/// until dropped; a transaction lives entirely on one such connection.
///
/// # Memory Databases
///
/// Memory locations are backed by a scratch file in a temporary directory,
/// always in write-ahead-log mode. Readers on other connections see the last
/// commit while a writer is open, as with file databases. The directory is
/// removed once the engine and every connection checked out of it are gone.
pub struct Engine {
    location: Location,
    pool: Pool<SqliteConnectionManager>,
    /// Scratch directory of a memory location. `None` for files.
    scratch: Option<Arc<TempDir>>,
}

impl Engine {
    /// Opens the database at `location`.
    ///
    /// One connection is opened eagerly, so a bad location fails here rather
    /// than after the pool's connection timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if parent directories or the scratch directory cannot
    /// be created, or SQLite cannot open the database.
    pub fn open(location: Location, options: &EngineOptions) -> EngineResult<Self> {
        let (path, scratch) = match &location {
            Location::File(path) => {
                if options.create_if_missing {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                (path.clone(), None)
            }
            Location::Memory(name) => {
                let dir = tempfile::Builder::new()
                    .prefix(&format!("{name}-"))
                    .tempdir()?;
                (dir.path().join(SCRATCH_FILE), Some(Arc::new(dir)))
            }
        };

        let manager = Self::manager(&path, location.is_memory(), options);

        // Fails fast on an unusable location.
        drop(manager.connect()?);

        let pool = Pool::builder()
            .max_size(options.max_connections.max(1))
            .min_idle(Some(0))
            .connection_timeout(options.connection_timeout)
            .build_unchecked(manager);

        debug!(%location, max_connections = options.max_connections, "engine opened");

        Ok(Self {
            location,
            pool,
            scratch,
        })
    }

    fn manager(path: &Path, scratch: bool, options: &EngineOptions) -> SqliteConnectionManager {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if options.create_if_missing || scratch {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let busy_timeout = options.busy_timeout;
        let wal = options.wal || scratch;

        SqliteConnectionManager::file(path)
            .with_flags(flags)
            .with_init(move |conn| {
                conn.busy_timeout(busy_timeout)?;
                if wal {
                    let _mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                }
                Ok(())
            })
    }

    /// Checks out a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection becomes available within the
    /// configured connection timeout.
    pub fn connect(&self) -> EngineResult<EngineConnection> {
        let conn = self.pool.get()?;
        Ok(EngineConnection::new(conn, self.scratch.clone()))
    }

    /// Returns the location this engine was opened on.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the number of connections currently held by the pool.
    #[must_use]
    pub fn connection_count(&self) -> u32 {
        self.pool.state().connections
    }

    /// Returns the scratch file backing a memory location.
    #[must_use]
    pub fn scratch_path(&self) -> Option<PathBuf> {
        self.scratch.as_ref().map(|dir| dir.path().join(SCRATCH_FILE))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Engine")
            .field("location", &self.location)
            .field("connections", &state.connections)
            .field("idle", &state.idle_connections)
            .finish_non_exhaustive()
    }
}
