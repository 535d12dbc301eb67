use crate::database::{
    DatabaseProvider, DeleteSpec, ExecutedQuery, FilterMap, InsertSpec, QuerySpec, SqlColumn,
    UpdateSpec,
};
use crate::database_config::DatabaseConfig;
use crate::document::Document;
use crate::errors::{ErrorKind, PolyError, PolyResult};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Default)]
struct State {
    connected: bool,
    tables: IndexMap<String, Vec<Document>>,
    operations: usize,
    inserts: usize,
    queries: usize,
    fail_queries: bool,
}

/// An in-memory provider that records what it was asked to do.
#[derive(Clone, Default)]
pub(crate) struct RecordingProvider {
    state: Arc<Mutex<State>>,
}

fn matches_all(filters: &FilterMap, document: &Document) -> bool {
    filters.values().all(|filter| filter.matches(document))
}

impl RecordingProvider {
    pub(crate) fn new() -> Self {
        RecordingProvider::default()
    }

    pub(crate) fn rows(&self, table: &str) -> Vec<Document> {
        self.state
            .lock()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn operation_count(&self) -> usize {
        self.state.lock().operations
    }

    pub(crate) fn insert_count(&self) -> usize {
        self.state.lock().inserts
    }

    pub(crate) fn query_count(&self) -> usize {
        self.state.lock().queries
    }

    /// Makes every subsequent query fail.
    pub(crate) fn fail_queries(&self) {
        self.state.lock().fail_queries = true;
    }
}

impl DatabaseProvider for RecordingProvider {
    fn connect(&self, _config: &DatabaseConfig) -> PolyResult<()> {
        self.state.lock().connected = true;
        Ok(())
    }

    fn disconnect(&self) -> PolyResult<()> {
        self.state.lock().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn create_table_if_not_exists(&self, name: &str, _columns: &[SqlColumn]) -> PolyResult<()> {
        let mut state = self.state.lock();
        state.operations += 1;
        state.tables.entry(name.to_string()).or_default();
        Ok(())
    }

    fn list_tables(&self) -> PolyResult<Vec<String>> {
        let mut state = self.state.lock();
        state.operations += 1;
        Ok(state.tables.keys().cloned().collect())
    }

    fn execute_query(&self, query: &QuerySpec) -> PolyResult<ExecutedQuery> {
        let mut state = self.state.lock();
        state.operations += 1;
        state.queries += 1;
        if state.fail_queries {
            return Err(PolyError::new("query rejected", ErrorKind::BackendExecution));
        }

        let mut rows: Vec<Document> = state
            .tables
            .get(query.table())
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(query.filters(), row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, order)) = query.order() {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(field), b.get(field)) {
                    (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                if order.direction() < 0 {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if !query.projection().is_empty() {
            rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter(|(key, _)| query.projection().contains(key))
                        .collect()
                })
                .collect();
        }

        Ok(ExecutedQuery::new(rows))
    }

    fn execute_update(&self, update: &UpdateSpec) -> PolyResult<()> {
        let mut state = self.state.lock();
        state.operations += 1;
        if let Some(rows) = state.tables.get_mut(update.table()) {
            for row in rows.iter_mut() {
                if matches_all(update.filters(), row) {
                    for (key, value) in update.assignments() {
                        row.set(key, value.clone())?;
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_insert(&self, insert: &InsertSpec) -> PolyResult<()> {
        let mut state = self.state.lock();
        state.operations += 1;
        state.inserts += 1;
        let row: Document = insert.values().clone().into_iter().collect();
        state
            .tables
            .entry(insert.table().to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    fn execute_delete(&self, delete: &DeleteSpec) -> PolyResult<()> {
        let mut state = self.state.lock();
        state.operations += 1;
        if let Some(rows) = state.tables.get_mut(delete.table()) {
            rows.retain(|row| !matches_all(delete.filters(), row));
        }
        Ok(())
    }
}
