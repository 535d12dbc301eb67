use crate::database::{
    DeleteSpec, ExecutedQuery, InsertSpec, QuerySpec, SqlColumn, UpdateSpec,
};
use crate::database_config::DatabaseConfig;
use crate::errors::PolyResult;

/// The capability interface every storage backend implements.
///
/// A provider translates the common operation model into its native
/// statements and talks to its connection collaborator. It does not check
/// the connection state: the [Database](super::Database) handle does that
/// before delegating, so every method here may assume a live connection
/// except the lifecycle methods themselves.
///
/// # Implementations
/// - `SqliteDatabase`: relational backend over `rusqlite`
/// - `DocumentStoreDatabase`: document-store backend over a
///   `DocumentStoreClient`
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; a `Database` handle is shared across
/// threads.
pub trait DatabaseProvider: Send + Sync {
    /// Opens the backend connection using `config`.
    fn connect(&self, config: &DatabaseConfig) -> PolyResult<()>;

    /// Closes the backend connection.
    fn disconnect(&self) -> PolyResult<()>;

    fn is_connected(&self) -> bool;

    /// Creates a table or collection unless one with the same name exists.
    /// Calling it twice must leave exactly one.
    fn create_table_if_not_exists(&self, name: &str, columns: &[SqlColumn]) -> PolyResult<()>;

    /// Lists the names of every table or collection.
    fn list_tables(&self) -> PolyResult<Vec<String>>;

    fn execute_query(&self, query: &QuerySpec) -> PolyResult<ExecutedQuery>;

    /// Applies the assignments to every matching record.
    fn execute_update(&self, update: &UpdateSpec) -> PolyResult<()>;

    /// Creates exactly one record.
    fn execute_insert(&self, insert: &InsertSpec) -> PolyResult<()>;

    /// Removes every matching record.
    fn execute_delete(&self, delete: &DeleteSpec) -> PolyResult<()>;

    /// Updates the matching records, or inserts one when nothing matches.
    ///
    /// The query and the write are two separate round trips with nothing
    /// tying them together, so two callers racing on the same key can both
    /// insert.
    fn execute_insert_or_update(&self, upsert: &UpdateSpec) -> PolyResult<()> {
        let query = QuerySpec::with_filters(upsert.table(), upsert.filters().clone());
        if self.execute_query(&query)?.is_set() {
            log::debug!("Upsert on '{}' matched, updating", upsert.table());
            return self.execute_update(upsert);
        }

        log::debug!("Upsert on '{}' matched nothing, inserting", upsert.table());
        let insert = InsertSpec::with_values(upsert.table(), upsert.insertion_values());
        self.execute_insert(&insert)
    }
}
