//! Database facade.

use crate::config::{BucketLayout, Config, DEFAULT_NAMESPACE};
use crate::error::{KvError, KvResult};
use crate::schema::Schema;
use crate::transaction::{managed, Transaction};
use kvite_engine::{Engine, Location};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The main database handle.
///
/// `Database` is the entry point to KVite. It owns the engine connection
/// pool and the schema, and hands out transactions. It is `Send + Sync` and
/// meant to be long-lived and shared.
///
/// # Opening a Database
///
/// ```rust,no_run
/// use kvite_core::Database;
///
/// // Backing table "kvite"
/// let db = Database::open("data/store.db", None)?;
///
/// // Backing table "sessions"
/// let sessions = Database::open("data/store.db", Some("sessions"))?;
/// # Ok::<(), kvite_core::KvError>(())
/// ```
///
/// # Managed Transactions
///
/// ```rust
/// use kvite_core::{Database, KvResult};
///
/// let db = Database::open_in_memory()?;
/// db.transaction(|txn| -> KvResult<()> {
///     let bucket = txn.bucket("test");
///     bucket.put("foo", b"bar")?;
///     bucket.put("baz", b"stuff")?;
///     Ok(())
/// })?;
/// # Ok::<(), kvite_core::KvError>(())
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Where the data lives.
    location: Location,
    /// Layout and statement templates, shared with transactions.
    schema: Arc<Schema>,
    /// Engine. `None` once closed.
    engine: RwLock<Option<Engine>>,
}

impl Database {
    /// Opens the database file at `path`.
    ///
    /// `namespace` names the backing table; `None` or an empty string selects
    /// [`crate::DEFAULT_NAMESPACE`].
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidIdentifier`] if the namespace is not a valid identifier
    /// - [`KvError::Connection`] if the engine cannot open the file
    /// - [`KvError::Bootstrap`] if the backing table cannot be created
    pub fn open(path: impl AsRef<Path>, namespace: Option<&str>) -> KvResult<Self> {
        let mut config = Config::default();
        if let Some(namespace) = namespace {
            config = config.namespace(namespace);
        }
        Self::open_with_config(path, config)
    }

    /// Opens the database file at `path` with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kvite_core::{BucketLayout, Config, Database};
    /// use std::time::Duration;
    ///
    /// let config = Config::default()
    ///     .namespace("cache")
    ///     .layout(BucketLayout::TablePerBucket)
    ///     .busy_timeout(Duration::from_secs(1));
    ///
    /// let db = Database::open_with_config("cache.db", config)?;
    /// # Ok::<(), kvite_core::KvError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Database::open`].
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> KvResult<Self> {
        Self::open_location(Location::file(path), config)
    }

    /// Opens a fresh in-memory database.
    ///
    /// Data is lost when the database is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be opened or bootstrapped.
    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_in_memory_with_config(Config::default())
    }

    /// Opens a fresh in-memory database with custom configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Database::open`].
    pub fn open_in_memory_with_config(config: Config) -> KvResult<Self> {
        Self::open_location(Location::memory(), config)
    }

    fn open_location(location: Location, mut config: Config) -> KvResult<Self> {
        if config.namespace.is_empty() {
            config.namespace = DEFAULT_NAMESPACE.to_string();
        }
        let schema = Schema::new(&config.namespace, config.layout)?;

        let engine = Engine::open(location.clone(), &config.engine_options())
            .map_err(|e| KvError::connection(&location, e))?;
        {
            let conn = engine
                .connect()
                .map_err(|e| KvError::connection(&location, e))?;
            schema.bootstrap(&conn)?;
        }

        info!(
            %location,
            namespace = %config.namespace,
            layout = ?config.layout,
            "database opened"
        );

        Ok(Self {
            config,
            location,
            schema: Arc::new(schema),
            engine: RwLock::new(Some(engine)),
        })
    }

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// - [`KvError::DatabaseClosed`] after [`Database::close`]
    /// - [`KvError::Engine`] if no connection is available or `BEGIN` fails
    pub fn begin(&self) -> KvResult<Transaction> {
        let engine = self.engine.read();
        let engine = engine.as_ref().ok_or(KvError::DatabaseClosed)?;
        let conn = engine.connect()?;
        Transaction::begin(Arc::clone(&self.schema), conn, self.config.begin_behavior)
    }

    /// Executes `f` within a managed transaction.
    ///
    /// If `f` returns `Ok`, the transaction is committed and a commit failure
    /// becomes the result. If `f` returns `Err`, the transaction is rolled
    /// back and that error is returned unchanged. If `f` panics, the
    /// transaction is rolled back while unwinding.
    ///
    /// `commit` and `rollback` fail with [`KvError::IllegalState`] inside `f`.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a begin/commit failure converted into `E`.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction) -> Result<T, E>,
        E: From<KvError>,
    {
        let txn = self.begin()?;
        managed::run(txn, f)
    }

    /// Lists the names of all buckets, sorted.
    ///
    /// Runs on its own connection, outside any open transaction. With the
    /// shared-table layout a bucket is listed only while it holds at least
    /// one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the query fails.
    pub fn buckets(&self) -> KvResult<Vec<String>> {
        let engine = self.engine.read();
        let engine = engine.as_ref().ok_or(KvError::DatabaseClosed)?;
        let conn = engine.connect()?;
        self.schema.buckets(&conn)
    }

    /// Closes the database.
    ///
    /// Idle connections are closed immediately; connections held by open
    /// transactions close when those transactions finish. Closing twice is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for engines that
    /// report release failures.
    pub fn close(&self) -> KvResult<()> {
        if self.engine.write().take().is_some() {
            info!(location = %self.location, "database closed");
        }
        Ok(())
    }

    /// Checks if the database is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.engine.read().is_some()
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns where the database lives.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the bucket layout.
    #[must_use]
    pub fn layout(&self) -> BucketLayout {
        self.schema.layout()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .field("namespace", &self.config.namespace)
            .field("layout", &self.layout())
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
