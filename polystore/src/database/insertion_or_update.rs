use crate::database::{Database, UpdateSpec};
use crate::errors::PolyResult;

/// Builder for an upsert.
///
/// On execution the filters are queried first. If anything matches, the
/// assignments are applied to every match. Otherwise a single record is
/// inserted holding the assignments plus the literal value of every
/// equality filter, so that the new record matches the same filters next
/// time.
///
/// ```text
/// db.insert_or_update("players")
///     .where_eq("uuid", id)
///     .set("coins", 10)
///     .execute()?;
/// ```
pub struct DatabaseInsertionOrUpdate {
    database: Database,
    spec: UpdateSpec,
}

impl DatabaseInsertionOrUpdate {
    pub(crate) fn new(database: Database, table: &str) -> Self {
        DatabaseInsertionOrUpdate {
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
        self.database.run_insert_or_update(&self.spec)
    }
}
