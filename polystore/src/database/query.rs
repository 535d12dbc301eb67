use crate::common::SortOrder;
use crate::database::{Database, ExecutedQuery, QuerySpec};
use crate::errors::PolyResult;

/// Builder for a select operation. Nothing is sent to the backend until
/// [DatabaseQuery::execute].
///
/// ```text
/// let top = db.query("players")
///     .where_eq("guild", "red")
///     .select(&["name", "score"])
///     .order_by("score", SortOrder::Descending)
///     .execute()?;
/// ```
pub struct DatabaseQuery {
    database: Database,
    spec: QuerySpec,
}

impl DatabaseQuery {
    pub(crate) fn new(database: Database, table: &str) -> Self {
        DatabaseQuery {
            database,
            spec: QuerySpec::new(table),
        }
    }

    filter_methods!(spec);

    /// Restricts the returned fields. Without it every field is returned.
    pub fn select(&mut self, fields: &[&str]) -> &mut Self {
        self.spec
            .set_projection(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn order_by(&mut self, field_name: &str, order: SortOrder) -> &mut Self {
        self.spec.set_order(field_name, order);
        self
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn execute(&self) -> PolyResult<ExecutedQuery> {
        self.database.run_query(&self.spec)
    }
}
