use crate::database::{Database, InsertSpec};
use crate::errors::PolyResult;

/// Builder for the insertion of exactly one record.
pub struct DatabaseInsertion {
    database: Database,
    spec: InsertSpec,
}

impl DatabaseInsertion {
    pub(crate) fn new(database: Database, spec: InsertSpec) -> Self {
        DatabaseInsertion { database, spec }
    }

    assignment_methods!(spec, values_mut);

    pub fn spec(&self) -> &InsertSpec {
        &self.spec
    }

    pub fn execute(&self) -> PolyResult<()> {
        self.database.run_insert(&self.spec)
    }
}
