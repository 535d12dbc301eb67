use crate::database::{Database, UpdateSpec};
use crate::errors::PolyResult;

/// Builder for an update of every matching record.
pub struct DatabaseUpdate {
    database: Database,
    spec: UpdateSpec,
}

impl DatabaseUpdate {
    pub(crate) fn new(database: Database, table: &str) -> Self {
        DatabaseUpdate {
            database,
            spec: UpdateSpec::new(table),
        }
    }

    filter_methods!(spec);

    assignment_methods!(spec, assignments_mut);

    pub fn spec(&self) -> &UpdateSpec {
        &self.spec
    }

    pub fn execute(&self) -> PolyResult<()> {
        self.database.run_update(&self.spec)
    }
}
