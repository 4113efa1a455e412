//! Table layout, statement templates and schema bootstrap.
//!
//! Only names that pass [`validate_identifier`] are ever interpolated into
//! statement text. Keys, values and (in the shared layout) bucket names are
//! always bound as parameters.

use crate::config::BucketLayout;
use crate::error::{KvError, KvResult};
use kvite_engine::{params, BeginMode, EngineConnection, EngineError, ToSql};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Longest accepted identifier.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Checks that `name` may be interpolated as a table name.
///
/// Accepted names match `[A-Za-z_][A-Za-z0-9_]*`, are at most
/// [`MAX_IDENTIFIER_LEN`] bytes long and do not use SQLite's reserved
/// `sqlite_` prefix.
///
/// # Errors
///
/// Returns [`KvError::InvalidIdentifier`] describing the first violation.
pub fn validate_identifier(name: &str) -> KvResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(KvError::invalid_identifier(name, "must not be empty"));
    };
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(KvError::invalid_identifier(name, "too long"));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(KvError::invalid_identifier(
            name,
            "must start with a letter or underscore",
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(KvError::invalid_identifier(
            name,
            "only letters, digits and underscores are allowed",
        ));
    }
    if name.len() >= 7 && name[..7].eq_ignore_ascii_case("sqlite_") {
        return Err(KvError::invalid_identifier(name, "reserved prefix sqlite_"));
    }
    Ok(())
}

/// Statement texts for one backing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statements {
    pub get: String,
    pub delete: String,
    pub put: String,
    pub iterate: String,
    /// Whether the bucket name is bound as the last parameter.
    pub binds_bucket: bool,
}

impl Statements {
    fn shared(table: &str) -> Self {
        Self {
            get: format!(r#"select value from "{table}" where key = ?1 and bucket = ?2"#),
            delete: format!(r#"delete from "{table}" where key = ?1 and bucket = ?2"#),
            put: format!(
                r#"insert or replace into "{table}" (key, value, bucket) values (?1, ?2, ?3)"#
            ),
            iterate: format!(r#"select key, value from "{table}" where bucket = ?1"#),
            binds_bucket: true,
        }
    }

    fn dedicated(table: &str) -> Self {
        Self {
            get: format!(r#"select value from "{table}" where key = ?1"#),
            delete: format!(r#"delete from "{table}" where key = ?1"#),
            put: format!(r#"insert or replace into "{table}" (key, value) values (?1, ?2)"#),
            iterate: format!(r#"select key, value from "{table}""#),
            binds_bucket: false,
        }
    }
}

/// Table listing the buckets of every per-bucket namespace in a file.
///
/// Names are compared case-insensitively, as SQLite compares table names.
pub const CATALOG_TABLE: &str = "kvite_catalog";

/// The resolved layout of one database.
#[derive(Debug)]
pub(crate) enum Schema {
    Shared {
        table: String,
        statements: Statements,
    },
    TablePerBucket {
        prefix: String,
    },
}

impl Schema {
    /// Resolves the layout for `namespace`, validating it as an identifier.
    pub fn new(namespace: &str, layout: BucketLayout) -> KvResult<Self> {
        validate_identifier(namespace)?;
        if namespace.eq_ignore_ascii_case(CATALOG_TABLE) {
            return Err(KvError::invalid_identifier(
                namespace,
                "reserved for the bucket catalog",
            ));
        }
        Ok(match layout {
            BucketLayout::SharedTable => Self::Shared {
                table: namespace.to_string(),
                statements: Statements::shared(namespace),
            },
            BucketLayout::TablePerBucket => Self::TablePerBucket {
                prefix: namespace.to_string(),
            },
        })
    }

    pub fn layout(&self) -> BucketLayout {
        match self {
            Self::Shared { .. } => BucketLayout::SharedTable,
            Self::TablePerBucket { .. } => BucketLayout::TablePerBucket,
        }
    }

    /// Creates the catalog and, for the shared layout, the backing table and
    /// its unique index, all inside one transaction.
    pub fn bootstrap(&self, conn: &EngineConnection) -> KvResult<()> {
        let table = match self {
            Self::Shared { table, .. } => table.as_str(),
            Self::TablePerBucket { .. } => CATALOG_TABLE,
        };

        conn.begin(BeginMode::Immediate)
            .map_err(|e| KvError::bootstrap(table, e))?;
        if let Err(e) = self.bootstrap_tables(conn).and_then(|()| {
            conn.commit().map_err(|e| KvError::bootstrap(table, e))
        }) {
            if let Err(rollback_err) = conn.rollback() {
                warn!(%table, error = %rollback_err, "bootstrap rollback failed");
            }
            return Err(e);
        }

        info!(%table, layout = ?self.layout(), "schema ready");
        Ok(())
    }

    fn bootstrap_tables(&self, conn: &EngineConnection) -> KvResult<()> {
        conn.execute_batch(&format!(
            r#"create table if not exists "{CATALOG_TABLE}" (
    namespace text not null collate nocase,
    bucket text not null collate nocase,
    table_name text not null collate nocase unique,
    primary key (namespace, bucket)
);"#
        ))
        .map_err(|e| KvError::bootstrap(CATALOG_TABLE, e))?;

        let Self::Shared { table, .. } = self else {
            return Ok(());
        };

        let owner = conn
            .query_row(
                &format!(r#"select namespace from "{CATALOG_TABLE}" where table_name = ?1"#),
                params![table],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| KvError::bootstrap(table.as_str(), e))?;
        if let Some(owner) = owner {
            return Err(KvError::illegal_state(format!(
                "table {table} holds a bucket of namespace {owner}"
            )));
        }

        conn.execute_batch(&format!(
            r#"create table if not exists "{table}" (key text not null, bucket text not null, value blob not null);
create unique index if not exists "{table}_key_bucket" on "{table}" (key, bucket);"#
        ))
        .map_err(|e| KvError::bootstrap(table.as_str(), e))
    }

    /// Returns the statements for `bucket`.
    ///
    /// In the per-bucket layout the bucket must be in this namespace's
    /// catalog; its registered table is used.
    pub fn statements(
        &self,
        conn: &EngineConnection,
        bucket: &str,
    ) -> KvResult<Cow<'_, Statements>> {
        match self {
            Self::Shared { statements, .. } => {
                if bucket.is_empty() {
                    return Err(KvError::InvalidBucketName {
                        name: bucket.to_string(),
                    });
                }
                Ok(Cow::Borrowed(statements))
            }
            Self::TablePerBucket { prefix } => {
                validate_identifier(bucket)?;
                let table = catalog_table(conn, prefix, bucket)?.ok_or_else(|| {
                    KvError::BucketNotFound {
                        name: bucket.to_string(),
                    }
                })?;
                Ok(Cow::Owned(Statements::dedicated(&table)))
            }
        }
    }

    /// Makes `bucket` available.
    ///
    /// A no-op in the shared layout. In the per-bucket layout this creates
    /// the bucket's table and registers it in the catalog, failing with
    /// [`KvError::BucketExists`] if the bucket is already registered unless
    /// `if_not_exists` is set. A table of the same name that is not this
    /// namespace's bucket is never adopted.
    pub fn create_bucket(
        &self,
        conn: &EngineConnection,
        bucket: &str,
        if_not_exists: bool,
    ) -> KvResult<()> {
        let prefix = match self {
            Self::Shared { .. } => {
                if bucket.is_empty() {
                    return Err(KvError::InvalidBucketName {
                        name: bucket.to_string(),
                    });
                }
                return Ok(());
            }
            Self::TablePerBucket { prefix } => prefix,
        };

        validate_identifier(bucket)?;
        if catalog_table(conn, prefix, bucket)?.is_some() {
            if if_not_exists {
                return Ok(());
            }
            return Err(KvError::bucket_exists(bucket));
        }

        let table = dedicated_table(prefix, bucket);
        let taken = conn.query_row(
            "select 1 from sqlite_master where name = ?1 collate nocase",
            params![table],
            |row| row.get::<_, i64>(0),
        )?;
        if taken.is_some() {
            return Err(KvError::illegal_state(format!(
                "table {table} exists outside namespace {prefix}"
            )));
        }

        conn.execute_batch(&format!(
            r#"create table "{table}" (key text not null primary key, value blob not null)"#
        ))?;
        conn.execute(
            &format!(
                r#"insert into "{CATALOG_TABLE}" (namespace, bucket, table_name) values (?1, ?2, ?3)"#
            ),
            params![prefix, bucket, table],
        )?;
        debug!(%bucket, %table, "bucket table created");
        Ok(())
    }

    /// Lists bucket names in ascending order.
    pub fn buckets(&self, conn: &EngineConnection) -> KvResult<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        let (sql, args) = match self {
            Self::Shared { table, .. } => (
                format!(r#"select distinct bucket from "{table}" order by bucket"#),
                Vec::new(),
            ),
            Self::TablePerBucket { prefix } => (
                format!(
                    r#"select bucket from "{CATALOG_TABLE}" where namespace = ?1 order by bucket"#
                ),
                vec![prefix as &dyn ToSql],
            ),
        };
        conn.query_each::<KvError, _>(&sql, &args, |row| {
            names.push(row.get(0).map_err(EngineError::from)?);
            Ok(())
        })?;
        Ok(names)
    }
}

/// Looks up the table registered for `bucket` in `namespace`.
fn catalog_table(
    conn: &EngineConnection,
    namespace: &str,
    bucket: &str,
) -> KvResult<Option<String>> {
    Ok(conn.query_row(
        &format!(
            r#"select table_name from "{CATALOG_TABLE}" where namespace = ?1 and bucket = ?2"#
        ),
        params![namespace, bucket],
        |row| row.get(0),
    )?)
}

fn dedicated_table(prefix: &str, bucket: &str) -> String {
    format!("{prefix}_{bucket}")
}
