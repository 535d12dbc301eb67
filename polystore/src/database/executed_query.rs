use crate::document::Document;
use std::fmt::{Display, Formatter};

/// The fully materialized result of a query.
///
/// Rows keep the order the backend returned them in and are always
/// read-only documents.
///
/// # Examples
///
/// ```rust
/// use polystore::database::ExecutedQuery;
/// use polystore::doc;
///
/// let result = ExecutedQuery::new(vec![doc! { name: "Alice" }, doc! { name: "Bob" }]);
/// assert_eq!(result.size(), 2);
/// assert!(result.first().map(|d| d.is_readonly()).unwrap_or(false));
/// assert_eq!(result.to_string(), "0. | name = 'Alice' \n1. | name = 'Bob' \n");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutedQuery {
    results: Vec<Document>,
}

impl ExecutedQuery {
    pub fn new(results: Vec<Document>) -> Self {
        ExecutedQuery {
            results: results.into_iter().map(|doc| doc.into_readonly()).collect(),
        }
    }

    pub fn first(&self) -> Option<&Document> {
        self.results.first()
    }

    /// Returns the first row, or the null-object document when there is none.
    pub fn first_or_empty(&self) -> Document {
        self.results.first().cloned().unwrap_or_else(Document::empty)
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.results.get(index)
    }

    pub fn all(&self) -> impl Iterator<Item = &Document> {
        self.results.iter()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.results.iter()
    }

    /// Copies every row into `collection` and hands it back.
    pub fn into_collection<C: Extend<Document>>(&self, mut collection: C) -> C {
        collection.extend(self.results.iter().cloned());
        collection
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Checks whether at least one row matched.
    pub fn is_set(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn size(&self) -> usize {
        self.results.len()
    }

    /// Logs the result table at info level.
    pub fn print(&self) {
        log::info!("{}", self);
    }
}

impl Display for ExecutedQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.results.is_empty() {
            return write!(f, "<Empty Result>");
        }

        for (index, result) in self.results.iter().enumerate() {
            write!(f, "{}. | ", index)?;
            for (key, value) in result.iter() {
                write!(f, "{} = '{}' ", key, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl IntoIterator for ExecutedQuery {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExecutedQuery {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
