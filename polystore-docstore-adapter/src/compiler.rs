//! Translation of the common operation model into document-store operator
//! syntax.
//!
//! | predicate | native expression |
//! |---|---|
//! | `where_eq("f", v)` | `{"f": {"$eq": v}}` |
//! | `where_ignore_case("f", s, true)` | `{"f": {"$regex": "^s$", "$options": "i"}}` |
//! | `field("f").gt(v)` | `{"f": {"$gt": v}}` |
//!
//! Case-insensitive patterns are anchored and escaped, so the given string
//! is matched literally.
use polystore::common::{SortOrder, Value};
use polystore::database::{AssignmentMap, FilterMap};
use polystore::filter::Filter;
use polystore::Document;

pub const EQ: &str = "$eq";
pub const NE: &str = "$ne";
pub const GT: &str = "$gt";
pub const GTE: &str = "$gte";
pub const LT: &str = "$lt";
pub const LTE: &str = "$lte";
pub const REGEX: &str = "$regex";
pub const OPTIONS: &str = "$options";
pub const SET: &str = "$set";
pub const ID_FIELD: &str = "_id";

fn condition(filter: &Filter) -> Document {
    match filter {
        Filter::Equals { value, .. } => [(EQ, value.clone())].into_iter().collect(),
        Filter::StringEquals {
            value,
            ignore_case: false,
            ..
        } => [(EQ, Value::from(value.as_str()))].into_iter().collect(),
        Filter::StringEquals {
            value,
            ignore_case: true,
            ..
        } => [
            (REGEX, Value::from(format!("^{}$", regex::escape(value)))),
            (OPTIONS, Value::from("i")),
        ]
        .into_iter()
        .collect(),
        Filter::Compare { mode, value, .. } => {
            [(mode.store_operator(), value.clone())].into_iter().collect()
        }
    }
}

/// Compiles filters into one filter document. An empty map matches every
/// document.
pub fn compile_filter(filters: &FilterMap) -> Document {
    filters
        .values()
        .map(|filter| (filter.field_name(), Value::from(condition(filter))))
        .collect()
}

/// Compiles assignments into a `$set` update document.
pub fn compile_update(assignments: &AssignmentMap) -> Document {
    let fields: Document = assignments
        .iter()
        .map(|(field, value)| (field.as_str(), value.clone()))
        .collect();
    [(SET, Value::from(fields))].into_iter().collect()
}

/// Compiles a field selection into an inclusion projection, or `None` when
/// every field is wanted.
pub fn compile_projection(fields: &[String]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }
    Some(fields.iter().map(|field| (field.as_str(), 1)).collect())
}

pub fn compile_sort(order: Option<(&str, SortOrder)>) -> Option<Document> {
    order.map(|(field, order)| [(field, order.direction())].into_iter().collect())
}

/// Builds the document inserted for the given values.
pub fn compile_insert(values: &AssignmentMap) -> Document {
    values
        .iter()
        .map(|(field, value)| (field.as_str(), value.clone()))
        .collect()
}
