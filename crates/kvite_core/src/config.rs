//! Database configuration.

use kvite_engine::{BeginMode, EngineOptions};
use std::time::Duration;

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "kvite";

/// How buckets map onto tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketLayout {
    /// One table named after the namespace, partitioned by a bucket column.
    ///
    /// Buckets are implicit and exist while they hold at least one key.
    #[default]
    SharedTable,
    /// One table per bucket, named `<namespace>_<bucket>`.
    ///
    /// Buckets are created explicitly and their names must be valid
    /// identifiers.
    TablePerBucket,
}

/// How a transaction takes its locks when it begins.
pub type BeginBehavior = BeginMode;

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing table name (shared layout) or table prefix (per-bucket layout).
    pub namespace: String,

    /// Bucket-to-table mapping.
    pub layout: BucketLayout,

    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// How long a statement waits on a locked database.
    pub busy_timeout: Duration,

    /// Whether to use write-ahead logging for file databases.
    pub wal: bool,

    /// Maximum number of pooled engine connections.
    pub max_connections: u32,

    /// How long `begin` waits for a free connection.
    pub connection_timeout: Duration,

    /// Lock acquisition mode for `begin`.
    pub begin_behavior: BeginBehavior,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            layout: BucketLayout::SharedTable,
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            wal: true,
            max_connections: 4,
            connection_timeout: Duration::from_secs(30),
            begin_behavior: BeginBehavior::Deferred,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace. An empty namespace selects the default.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            namespace
        };
        self
    }

    /// Sets the bucket layout.
    #[must_use]
    pub const fn layout(mut self, layout: BucketLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether file databases use write-ahead logging.
    #[must_use]
    pub const fn wal(mut self, value: bool) -> Self {
        self.wal = value;
        self
    }

    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub const fn max_connections(mut self, value: u32) -> Self {
        self.max_connections = value;
        self
    }

    /// Sets how long `begin` waits for a free connection.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the lock acquisition mode for `begin`.
    #[must_use]
    pub const fn begin_behavior(mut self, behavior: BeginBehavior) -> Self {
        self.begin_behavior = behavior;
        self
    }

    pub(crate) fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            create_if_missing: self.create_if_missing,
            busy_timeout: self.busy_timeout,
            wal: self.wal,
            max_connections: self.max_connections,
            connection_timeout: self.connection_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.layout, BucketLayout::SharedTable);
        assert!(config.create_if_missing);
        assert!(config.wal);
        assert_eq!(config.begin_behavior, BeginBehavior::Deferred);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .namespace("store")
            .layout(BucketLayout::TablePerBucket)
            .create_if_missing(false)
            .max_connections(2)
            .begin_behavior(BeginBehavior::Immediate);

        assert_eq!(config.namespace, "store");
        assert_eq!(config.layout, BucketLayout::TablePerBucket);
        assert!(!config.create_if_missing);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.begin_behavior, BeginBehavior::Immediate);
    }

    #[test]
    fn empty_namespace_selects_default() {
        let config = Config::new().namespace("");
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn engine_options_follow_config() {
        let config = Config::new()
            .wal(false)
            .busy_timeout(Duration::from_millis(250));
        let options = config.engine_options();
        assert!(!options.wal);
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
        assert_eq!(options.max_connections, config.max_connections);
    }
}
