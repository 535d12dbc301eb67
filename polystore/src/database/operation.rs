use crate::common::{SortOrder, Value};
use crate::filter::Filter;
use indexmap::IndexMap;

/// Filters keyed by field. Inserting a filter for a field that already has
/// one replaces it in place.
pub type FilterMap = IndexMap<String, Filter>;

/// New values keyed by field, in assignment order.
pub type AssignmentMap = IndexMap<String, Value>;

pub(crate) fn put_filter(filters: &mut FilterMap, filter: Filter) {
    filters.insert(filter.field_name().to_string(), filter);
}

/// A select operation as handed to a [DatabaseProvider](super::DatabaseProvider).
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    table: String,
    filters: FilterMap,
    projection: Vec<String>,
    order: Option<(String, SortOrder)>,
}

impl QuerySpec {
    pub fn new(table: &str) -> Self {
        QuerySpec {
            table: table.to_string(),
            ..QuerySpec::default()
        }
    }

    pub(crate) fn with_filters(table: &str, filters: FilterMap) -> Self {
        QuerySpec {
            table: table.to_string(),
            filters,
            ..QuerySpec::default()
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    /// Selected fields. Empty means every field.
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn order(&self) -> Option<(&str, SortOrder)> {
        self.order
            .as_ref()
            .map(|(field, order)| (field.as_str(), *order))
    }

    pub(crate) fn filters_mut(&mut self) -> &mut FilterMap {
        &mut self.filters
    }

    pub(crate) fn set_projection(&mut self, fields: Vec<String>) {
        self.projection = fields;
    }

    pub(crate) fn set_order(&mut self, field: &str, order: SortOrder) {
        self.order = Some((field.to_string(), order));
    }
}

/// An update of every matching record, also used by `insert_or_update`.
#[derive(Debug, Clone, Default)]
pub struct UpdateSpec {
    table: String,
    filters: FilterMap,
    assignments: AssignmentMap,
}

impl UpdateSpec {
    pub fn new(table: &str) -> Self {
        UpdateSpec {
            table: table.to_string(),
            ..UpdateSpec::default()
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    /// The record an upsert inserts when nothing matches: every assignment,
    /// then every filter's literal value on top.
    pub fn insertion_values(&self) -> AssignmentMap {
        let mut values = self.assignments.clone();
        for (field, filter) in self.filters.iter() {
            if let Some(value) = filter.literal_value() {
                values.insert(field.clone(), value);
            }
        }
        values
    }

    pub(crate) fn filters_mut(&mut self) -> &mut FilterMap {
        &mut self.filters
    }

    pub(crate) fn assignments_mut(&mut self) -> &mut AssignmentMap {
        &mut self.assignments
    }
}

/// An insertion of exactly one record.
#[derive(Debug, Clone, Default)]
pub struct InsertSpec {
    table: String,
    values: AssignmentMap,
}

impl InsertSpec {
    pub fn new(table: &str) -> Self {
        InsertSpec {
            table: table.to_string(),
            values: AssignmentMap::new(),
        }
    }

    pub(crate) fn with_values(table: &str, values: AssignmentMap) -> Self {
        InsertSpec {
            table: table.to_string(),
            values,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn values(&self) -> &AssignmentMap {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut AssignmentMap {
        &mut self.values
    }
}

/// A deletion of every matching record.
#[derive(Debug, Clone, Default)]
pub struct DeleteSpec {
    table: String,
    filters: FilterMap,
}

impl DeleteSpec {
    pub fn new(table: &str) -> Self {
        DeleteSpec {
            table: table.to_string(),
            filters: FilterMap::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub(crate) fn filters_mut(&mut self) -> &mut FilterMap {
        &mut self.filters
    }
}
