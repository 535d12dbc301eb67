use polystore::errors::PolyResult;
use polystore::{DatabaseConfig, Document};

/// Connection to a schemaless document store.
///
/// Filters, updates, projections and sorts are documents in operator
/// syntax as produced by [crate::compiler]. A driver for a networked store
/// implements this trait; [crate::InMemoryDocumentStore] implements it in
/// process.
pub trait DocumentStoreClient: Send + Sync {
    /// Opens the connection described by `config`.
    fn open(&self, config: &DatabaseConfig) -> PolyResult<()>;

    fn close(&self) -> PolyResult<()>;

    fn is_open(&self) -> bool;

    fn list_collection_names(&self) -> PolyResult<Vec<String>>;

    fn create_collection(&self, name: &str) -> PolyResult<()>;

    /// Returns every document of `collection` matching `filter`, reduced to
    /// `projection` and ordered by `sort` when given.
    fn find(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<&Document>,
        sort: Option<&Document>,
    ) -> PolyResult<Vec<Document>>;

    /// Applies `update` to every match and returns the number of matches.
    fn update_many(&self, collection: &str, filter: &Document, update: &Document)
        -> PolyResult<u64>;

    fn insert_one(&self, collection: &str, document: Document) -> PolyResult<()>;

    /// Removes every match and returns how many were removed.
    fn delete_many(&self, collection: &str, filter: &Document) -> PolyResult<u64>;
}
