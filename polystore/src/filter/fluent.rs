use crate::common::Value;

use super::{ComparisonMode, Filter};

/// Creates a fluent filter builder for the specified field name.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// Each method consumes the builder and returns a [Filter] ready to be
/// handed to a query or mutation builder.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches when the field equals the value exactly.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Equals {
            field: self.field_name,
            value: value.into(),
        }
    }

    /// Matches when the field equals the string, ignoring case.
    #[inline]
    pub fn eq_ignore_case(self, value: &str) -> Filter {
        self.string_eq(value, true)
    }

    /// Matches a string field, optionally ignoring case.
    #[inline]
    pub fn string_eq(self, value: &str, ignore_case: bool) -> Filter {
        Filter::StringEquals {
            field: self.field_name,
            value: value.to_string(),
            ignore_case,
        }
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(ComparisonMode::NotEquals, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(ComparisonMode::Greater, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(ComparisonMode::GreaterEqual, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(ComparisonMode::Lesser, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(ComparisonMode::LesserEqual, value)
    }

    fn compare<T: Into<Value>>(self, mode: ComparisonMode, value: T) -> Filter {
        Filter::Compare {
            field: self.field_name,
            mode,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq() {
        assert_eq!(
            field("name").eq("x"),
            Filter::Equals {
                field: "name".to_string(),
                value: Value::from("x"),
            }
        );
    }

    #[test]
    fn test_eq_ignore_case() {
        assert_eq!(
            field("name").eq_ignore_case("bob"),
            Filter::StringEquals {
                field: "name".to_string(),
                value: "bob".to_string(),
                ignore_case: true,
            }
        );
    }

    #[test]
    fn test_comparisons() {
        let modes: Vec<ComparisonMode> = vec![
            field("a").ne(1),
            field("a").gt(1),
            field("a").gte(1),
            field("a").lt(1),
            field("a").lte(1),
        ]
        .into_iter()
        .filter_map(|f| match f {
            Filter::Compare { mode, .. } => Some(mode),
            _ => None,
        })
        .collect();

        assert_eq!(
            modes,
            vec![
                ComparisonMode::NotEquals,
                ComparisonMode::Greater,
                ComparisonMode::GreaterEqual,
                ComparisonMode::Lesser,
                ComparisonMode::LesserEqual,
            ]
        );
    }
}
