use crate::common::Value;
use crate::document::Document;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// The relational operator of a [Filter::Compare] predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    NotEquals,
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    /// The SQL operator for this mode.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            ComparisonMode::NotEquals => "<>",
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }

    /// The document-store operator for this mode.
    pub fn store_operator(&self) -> &'static str {
        match self {
            ComparisonMode::NotEquals => "$ne",
            ComparisonMode::Greater => "$gt",
            ComparisonMode::GreaterEqual => "$gte",
            ComparisonMode::Lesser => "$lt",
            ComparisonMode::LesserEqual => "$lte",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::NotEquals => ordering != Ordering::Equal,
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }
}

/// A predicate on a single field.
///
/// `Equals` is the typed catch-all: any value that converts into a [Value]
/// can be matched exactly. `StringEquals` adds optional case-insensitive
/// matching, which each backend implements independently of its collation.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals {
        field: String,
        value: Value,
    },
    StringEquals {
        field: String,
        value: String,
        ignore_case: bool,
    },
    Compare {
        field: String,
        mode: ComparisonMode,
        value: Value,
    },
}

impl Filter {
    /// The field this filter applies to.
    pub fn field_name(&self) -> &str {
        match self {
            Filter::Equals { field, .. } => field.as_str(),
            Filter::StringEquals { field, .. } => field.as_str(),
            Filter::Compare { field, .. } => field.as_str(),
        }
    }

    /// The value an upsert copies into a freshly inserted record.
    ///
    /// Only equality predicates pin a field to one literal value. A
    /// comparison has no such value and returns `None`.
    pub fn literal_value(&self) -> Option<Value> {
        match self {
            Filter::Equals { value, .. } => Some(value.clone()),
            Filter::StringEquals { value, .. } => Some(Value::String(value.clone())),
            Filter::Compare { .. } => None,
        }
    }

    /// Evaluates the filter against a document in memory.
    ///
    /// A missing field only matches `Equals` against [Value::Null]. A
    /// missing or null field never matches `NotEquals`.
    pub fn matches(&self, document: &Document) -> bool {
        let actual = document.get(self.field_name());
        match self {
            Filter::Equals { value, .. } => match actual {
                Some(actual) => actual.query_eq(value),
                None => value.is_null(),
            },
            Filter::StringEquals {
                value, ignore_case, ..
            } => match actual.and_then(|v| v.as_string()) {
                Some(actual) if *ignore_case => actual.to_lowercase() == value.to_lowercase(),
                Some(actual) => actual == value,
                None => false,
            },
            Filter::Compare {
                mode: ComparisonMode::NotEquals,
                value,
                ..
            } => actual
                .filter(|actual| !actual.is_null())
                .map(|actual| !actual.query_eq(value))
                .unwrap_or(false),
            Filter::Compare { mode, value, .. } => actual
                .filter(|actual| !actual.is_null())
                .and_then(|actual| actual.compare(value))
                .map(|ordering| mode.accepts(ordering))
                .unwrap_or(false),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Equals { field, value } => write!(f, "({} == {})", field, value),
            Filter::StringEquals {
                field,
                value,
                ignore_case: true,
            } => write!(f, "({} ~= {})", field, value),
            Filter::StringEquals { field, value, .. } => write!(f, "({} == {})", field, value),
            Filter::Compare { field, mode, value } => {
                write!(f, "({} {} {})", field, mode.sql_operator(), value)
            }
        }
    }
}
