use crate::client::DocumentStoreClient;
use crate::compiler::{
    compile_filter, compile_insert, compile_projection, compile_sort, compile_update,
};
use crate::memory::InMemoryDocumentStore;
use polystore::database::{
    DatabaseProvider, DeleteSpec, ExecutedQuery, InsertSpec, QuerySpec, SqlColumn, UpdateSpec,
};
use polystore::errors::PolyResult;
use polystore::DatabaseConfig;
use std::sync::Arc;

/// Port reported for a configuration that does not name one.
pub const DEFAULT_PORT: u16 = 27017;

/// A document-store backend.
///
/// Tables are collections. Builders compile to operator documents and run
/// through the [DocumentStoreClient]; column declarations are ignored since
/// collections carry no schema.
#[derive(Clone)]
pub struct DocumentStoreDatabase {
    client: Arc<dyn DocumentStoreClient>,
}

impl DocumentStoreDatabase {
    pub fn new<C: DocumentStoreClient + 'static>(client: C) -> Self {
        DocumentStoreDatabase {
            client: Arc::new(client),
        }
    }

    /// A backend over a fresh [InMemoryDocumentStore].
    pub fn in_memory() -> Self {
        DocumentStoreDatabase::new(InMemoryDocumentStore::new())
    }

    pub fn client(&self) -> &dyn DocumentStoreClient {
        self.client.as_ref()
    }
}

impl DatabaseProvider for DocumentStoreDatabase {
    fn connect(&self, config: &DatabaseConfig) -> PolyResult<()> {
        log::debug!(
            "Connecting to document store {}:{}/{}",
            config.host(),
            config.port_or(DEFAULT_PORT),
            config.database()
        );
        self.client.open(config)
    }

    fn disconnect(&self) -> PolyResult<()> {
        self.client.close()
    }

    fn is_connected(&self) -> bool {
        self.client.is_open()
    }

    fn create_table_if_not_exists(&self, name: &str, _columns: &[SqlColumn]) -> PolyResult<()> {
        let names = self.client.list_collection_names()?;
        if names.iter().any(|existing| existing == name) {
            return Ok(());
        }
        log::debug!("Creating collection '{}'", name);
        self.client.create_collection(name)
    }

    fn list_tables(&self) -> PolyResult<Vec<String>> {
        self.client.list_collection_names()
    }

    fn execute_query(&self, query: &QuerySpec) -> PolyResult<ExecutedQuery> {
        let filter = compile_filter(query.filters());
        let projection = compile_projection(query.projection());
        let sort = compile_sort(query.order());
        log::debug!("Find in '{}' with {}", query.table(), filter);

        let documents =
            self.client
                .find(query.table(), &filter, projection.as_ref(), sort.as_ref())?;
        Ok(ExecutedQuery::new(documents))
    }

    fn execute_update(&self, update: &UpdateSpec) -> PolyResult<()> {
        if update.assignments().is_empty() {
            log::debug!("Update on '{}' assigns nothing, skipping", update.table());
            return Ok(());
        }

        let filter = compile_filter(update.filters());
        let document = compile_update(update.assignments());
        log::debug!("Update in '{}' with {} -> {}", update.table(), filter, document);

        let matched = self
            .client
            .update_many(update.table(), &filter, &document)?;
        log::debug!("Updated {} document(s) in '{}'", matched, update.table());
        Ok(())
    }

    fn execute_insert(&self, insert: &InsertSpec) -> PolyResult<()> {
        let document = compile_insert(insert.values());
        log::debug!("Insert into '{}': {}", insert.table(), document);
        self.client.insert_one(insert.table(), document)
    }

    fn execute_delete(&self, delete: &DeleteSpec) -> PolyResult<()> {
        let filter = compile_filter(delete.filters());
        let removed = self.client.delete_many(delete.table(), &filter)?;
        log::debug!("Deleted {} document(s) from '{}'", removed, delete.table());
        Ok(())
    }
}
