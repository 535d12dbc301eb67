use crate::database::{Database, DeleteSpec};
use crate::errors::PolyResult;

/// Builder for the deletion of every matching record. Without filters it
/// empties the table.
pub struct DatabaseDeletion {
    database: Database,
    spec: DeleteSpec,
}

impl DatabaseDeletion {
    pub(crate) fn new(database: Database, table: &str) -> Self {
        DatabaseDeletion {
            database,
            spec: DeleteSpec::new(table),
        }
    }

    filter_methods!(spec);

    pub fn spec(&self) -> &DeleteSpec {
        &self.spec
    }

    pub fn execute(&self) -> PolyResult<()> {
        self.database.run_delete(&self.spec)
    }
}
