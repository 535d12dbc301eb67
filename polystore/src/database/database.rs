use crate::common::{LockRegistry, Value};
use crate::database::{
    DatabaseDeletion, DatabaseInsertion, DatabaseInsertionOrUpdate, DatabaseProvider,
    DatabaseQuery, DatabaseUpdate, DeleteSpec, ExecutedQuery, InsertSpec, QuerySpec, SqlColumn,
    UpdateSpec,
};
use crate::database_config::DatabaseConfig;
use crate::document::Document;
use crate::errors::{ErrorKind, PolyError, PolyResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// A handle to one backend.
///
/// `Database` wraps a [DatabaseProvider] together with its configuration and
/// the per-table locks used by `insert_or_update`. Cloning is cheap and all
/// clones share the same connection, so a handle can be passed freely
/// between threads.
///
/// The handle moves from disconnected to connected with [Database::connect]
/// and back with [Database::disconnect]. Every data operation checks the
/// state first and fails with [ErrorKind::ConnectionState] when the handle
/// is not connected.
///
/// # Examples
///
/// ```text
/// let db = Database::new(SqliteDatabase::new(), DatabaseConfig::default());
/// db.connect()?;
/// db.insert("players").set("name", "Alice").set("coins", 5).execute()?;
/// let alice = db.query("players").where_eq("name", "Alice").execute()?;
/// db.disconnect()?;
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    provider: Box<dyn DatabaseProvider>,
    config: DatabaseConfig,
    lock_registry: LockRegistry,
    lifecycle: Mutex<()>,
}

impl Database {
    pub fn new<P: DatabaseProvider + 'static>(provider: P, config: DatabaseConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner {
                provider: Box::new(provider),
                config,
                lock_registry: LockRegistry::new(),
                lifecycle: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.inner.config
    }

    /// Opens the backend connection.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConnectionState] if already connected, or whatever the
    /// backend reports when the connection cannot be opened.
    pub fn connect(&self) -> PolyResult<()> {
        let _guard = self.inner.lifecycle.lock();
        if self.inner.provider.is_connected() {
            log::error!("Database is already connected");
            return Err(PolyError::new(
                "Database is already connected",
                ErrorKind::ConnectionState,
            ));
        }

        self.inner.provider.connect(&self.inner.config)?;
        log::debug!("Connected to database '{}'", self.inner.config.database());
        Ok(())
    }

    /// Closes the backend connection.
    pub fn disconnect(&self) -> PolyResult<()> {
        let _guard = self.inner.lifecycle.lock();
        if !self.inner.provider.is_connected() {
            log::error!("Database is not connected");
            return Err(PolyError::new(
                "Database is not connected",
                ErrorKind::ConnectionState,
            ));
        }

        self.inner.provider.disconnect()?;
        log::debug!("Disconnected from database '{}'", self.inner.config.database());
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.inner.provider.is_connected()
    }

    fn check_connected(&self, operation: &str) -> PolyResult<()> {
        if self.inner.provider.is_connected() {
            Ok(())
        } else {
            log::error!("Cannot {} while the database is not connected", operation);
            Err(PolyError::new(
                &format!("Cannot {} while the database is not connected", operation),
                ErrorKind::ConnectionState,
            ))
        }
    }

    /// Creates a table (or collection) unless it already exists.
    pub fn create_table_if_not_exists(&self, name: &str, columns: &[SqlColumn]) -> PolyResult<()> {
        self.check_connected("create a table")?;
        for column in columns {
            column.type_declaration()?;
        }
        self.inner.provider.create_table_if_not_exists(name, columns)
    }

    pub fn list_tables(&self) -> PolyResult<Vec<String>> {
        self.check_connected("list tables")?;
        self.inner.provider.list_tables()
    }

    pub fn query(&self, table: &str) -> DatabaseQuery {
        DatabaseQuery::new(self.clone(), table)
    }

    pub fn update(&self, table: &str) -> DatabaseUpdate {
        DatabaseUpdate::new(self.clone(), table)
    }

    pub fn insert(&self, table: &str) -> DatabaseInsertion {
        DatabaseInsertion::new(self.clone(), InsertSpec::new(table))
    }

    /// Starts an insertion pre-filled with `values`.
    pub fn insert_values<K, V, I>(&self, table: &str, values: I) -> DatabaseInsertion
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = values
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        DatabaseInsertion::new(self.clone(), InsertSpec::with_values(table, values))
    }

    /// Starts an insertion pre-filled with the top-level entries of `document`.
    pub fn insert_document(&self, table: &str, document: &Document) -> DatabaseInsertion {
        DatabaseInsertion::new(
            self.clone(),
            InsertSpec::with_values(table, document.values()),
        )
    }

    pub fn delete(&self, table: &str) -> DatabaseDeletion {
        DatabaseDeletion::new(self.clone(), table)
    }

    pub fn insert_or_update(&self, table: &str) -> DatabaseInsertionOrUpdate {
        DatabaseInsertionOrUpdate::new(self.clone(), table)
    }

    pub(crate) fn run_query(&self, spec: &QuerySpec) -> PolyResult<ExecutedQuery> {
        self.check_connected("execute a query")?;
        self.inner.provider.execute_query(spec)
    }

    pub(crate) fn run_update(&self, spec: &UpdateSpec) -> PolyResult<()> {
        self.check_connected("execute an update")?;
        self.inner.provider.execute_update(spec)
    }

    pub(crate) fn run_insert(&self, spec: &InsertSpec) -> PolyResult<()> {
        self.check_connected("execute an insertion")?;
        self.inner.provider.execute_insert(spec)
    }

    pub(crate) fn run_delete(&self, spec: &DeleteSpec) -> PolyResult<()> {
        self.check_connected("execute a deletion")?;
        self.inner.provider.execute_delete(spec)
    }

    pub(crate) fn run_insert_or_update(&self, spec: &UpdateSpec) -> PolyResult<()> {
        self.check_connected("execute an upsert")?;
        // serializes upserts on the same table through this handle only
        let lock = self.inner.lock_registry.get_lock(spec.table());
        let _guard = lock.lock();
        self.inner.provider.execute_insert_or_update(spec)
    }
}
