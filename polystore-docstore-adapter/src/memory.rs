use crate::client::DocumentStoreClient;
use crate::compiler::{EQ, GT, GTE, ID_FIELD, LT, LTE, NE, OPTIONS, REGEX, SET};
use dashmap::DashMap;
use polystore::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor};
use polystore::errors::{ErrorKind, PolyError, PolyResult};
use polystore::{DatabaseConfig, Document};
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use uuid::Uuid;

type Collection = Atomic<Vec<Document>>;

/// An in-process document store.
///
/// Collections live in a concurrent map and survive `close()`, the way a
/// server keeps its data when a client disconnects. Clones share the same
/// collections. Filters, updates, projections and sorts are evaluated from
/// their operator syntax.
///
/// Supported filter operators are `$eq`, `$ne`, `$gt`, `$gte`, `$lt`,
/// `$lte` and `$regex` with `$options`. A plain value is an implicit `$eq`.
/// Numbers compare by value across integers and floats. `$ne` skips
/// documents where the field is missing or null, as SQL `<>` does.
/// Updates support `$set`.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<InMemoryDocumentStoreInner>,
}

#[derive(Default)]
struct InMemoryDocumentStoreInner {
    open: AtomicBool,
    collections: DashMap<String, Collection>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        InMemoryDocumentStore::default()
    }

    /// Number of documents currently stored in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|entry| entry.value().read_with(|docs| docs.len()))
            .unwrap_or(0)
    }

    fn check_open(&self) -> PolyResult<()> {
        if self.inner.open.load(AtomicOrdering::Relaxed) {
            Ok(())
        } else {
            log::error!("Document store is not open");
            Err(PolyError::new(
                "Document store is not open",
                ErrorKind::ConnectionState,
            ))
        }
    }

    fn collection(&self, name: &str) -> Option<Collection> {
        self.inner
            .collections
            .get(name)
            .map(|entry| entry.value().clone())
    }

    fn collection_or_create(&self, name: &str) -> Collection {
        self.inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| atomic(Vec::new()))
            .value()
            .clone()
    }
}

impl DocumentStoreClient for InMemoryDocumentStore {
    fn open(&self, config: &DatabaseConfig) -> PolyResult<()> {
        log::debug!("Opening in-memory document store '{}'", config.database());
        self.inner.open.store(true, AtomicOrdering::Relaxed);
        Ok(())
    }

    fn close(&self) -> PolyResult<()> {
        self.inner.open.store(false, AtomicOrdering::Relaxed);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.open.load(AtomicOrdering::Relaxed)
    }

    fn list_collection_names(&self) -> PolyResult<Vec<String>> {
        self.check_open()?;
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_collection(&self, name: &str) -> PolyResult<()> {
        self.check_open()?;
        if self.inner.collections.contains_key(name) {
            log::error!("Collection '{}' already exists", name);
            return Err(PolyError::new(
                &format!("Collection '{}' already exists", name),
                ErrorKind::BackendExecution,
            ));
        }
        self.collection_or_create(name);
        Ok(())
    }

    fn find(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<&Document>,
        sort: Option<&Document>,
    ) -> PolyResult<Vec<Document>> {
        self.check_open()?;
        let Some(collection) = self.collection(collection) else {
            return Ok(Vec::new());
        };

        let mut found = collection.read_with(|docs| -> PolyResult<Vec<Document>> {
            let mut found = Vec::new();
            for doc in docs {
                if matches_filter(doc, filter)? {
                    found.push(doc.clone());
                }
            }
            Ok(found)
        })?;

        if let Some(sort) = sort {
            found.sort_by(|a, b| compare_by(a, b, sort));
        }

        match projection {
            Some(projection) => Ok(found.iter().map(|doc| project(doc, projection)).collect()),
            None => Ok(found),
        }
    }

    fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> PolyResult<u64> {
        self.check_open()?;
        let assignments = set_fields(update)?;
        let Some(collection) = self.collection(collection) else {
            return Ok(0);
        };

        collection.write_with(|docs| -> PolyResult<u64> {
            let mut matched = 0;
            for doc in docs.iter_mut() {
                if matches_filter(doc, filter)? {
                    doc.merge(&assignments)?;
                    matched += 1;
                }
            }
            Ok(matched)
        })
    }

    fn insert_one(&self, collection: &str, document: Document) -> PolyResult<()> {
        self.check_open()?;
        // stored documents must stay writable for later updates
        let mut document: Document = document.into_iter().collect();
        if !document.contains(ID_FIELD) {
            document.set(ID_FIELD, Uuid::new_v4())?;
        }
        self.collection_or_create(collection)
            .write_with(|docs| docs.push(document));
        Ok(())
    }

    fn delete_many(&self, collection: &str, filter: &Document) -> PolyResult<u64> {
        self.check_open()?;
        let Some(collection) = self.collection(collection) else {
            return Ok(0);
        };

        collection.write_with(|docs| -> PolyResult<u64> {
            let before = docs.len();
            let mut keep = Vec::with_capacity(before);
            for doc in docs.iter() {
                keep.push(!matches_filter(doc, filter)?);
            }
            let mut keep = keep.into_iter();
            docs.retain(|_| keep.next().unwrap_or(true));
            Ok((before - docs.len()) as u64)
        })
    }
}

fn unsupported(message: String) -> PolyError {
    log::error!("{}", message);
    PolyError::new(&message, ErrorKind::UnsupportedOperation)
}

fn set_fields(update: &Document) -> PolyResult<Document> {
    let mut fields = Document::new();
    for (operator, value) in update.iter() {
        match (operator.as_str(), value) {
            (SET, Value::Document(assignments)) => fields.merge(assignments)?,
            _ => return Err(unsupported(format!("Unsupported update operator '{}'", operator))),
        }
    }
    Ok(fields)
}

fn matches_filter(doc: &Document, filter: &Document) -> PolyResult<bool> {
    for (field, condition) in filter.iter() {
        let actual = doc.get(field);
        let matched = match condition {
            Value::Document(operators) if is_operator_document(operators) => {
                matches_operators(actual, operators)?
            }
            expected => equals(actual, expected),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys().next().map(|key| key.starts_with('$')).unwrap_or(false)
}

fn matches_operators(actual: Option<&Value>, operators: &Document) -> PolyResult<bool> {
    for (operator, expected) in operators.iter() {
        let matched = match operator.as_str() {
            EQ => equals(actual, expected),
            NE => present(actual) && !equals(actual, expected),
            GT => ordering(actual, expected) == Some(Ordering::Greater),
            GTE => matches!(
                ordering(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            LT => ordering(actual, expected) == Some(Ordering::Less),
            LTE => matches!(
                ordering(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            REGEX => matches_regex(actual, expected, operators.get(OPTIONS))?,
            OPTIONS => true,
            other => return Err(unsupported(format!("Unsupported filter operator '{}'", other))),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

// a missing field equals null
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    actual.unwrap_or(&Value::Null).query_eq(expected)
}

fn present(actual: Option<&Value>) -> bool {
    actual.map(|value| !value.is_null()).unwrap_or(false)
}

fn ordering(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    actual
        .filter(|value| !value.is_null())
        .and_then(|value| value.compare(expected))
}

fn matches_regex(
    actual: Option<&Value>,
    pattern: &Value,
    options: Option<&Value>,
) -> PolyResult<bool> {
    let Some(pattern) = pattern.as_string() else {
        return Err(unsupported("$regex expects a string pattern".to_string()));
    };
    let options = options
        .and_then(|v| v.as_string())
        .map(|s| s.as_str())
        .unwrap_or("");
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .build()
        .map_err(|err| {
            log::error!("Invalid $regex pattern '{}': {}", pattern, err);
            PolyError::new(
                &format!("Invalid $regex pattern '{}': {}", pattern, err),
                ErrorKind::InvalidOperation,
            )
        })?;

    Ok(actual
        .and_then(|value| value.as_string())
        .map(|text| regex.is_match(text))
        .unwrap_or(false))
}

// null and missing sort before every other value
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn compare_by(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort.iter() {
        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = if direction.as_integer().unwrap_or(1) < 0 {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// `_id` stays unless excluded with `_id: 0`
fn project(doc: &Document, projection: &Document) -> Document {
    let keep_id = projection
        .get(ID_FIELD)
        .and_then(|v| v.as_integer())
        .map(|v| v != 0)
        .unwrap_or(true);

    doc.iter()
        .filter(|(key, _)| {
            if key.as_str() == ID_FIELD {
                keep_id
            } else {
                projection
                    .get(key)
                    .and_then(|v| v.as_integer())
                    .map(|v| v != 0)
                    .unwrap_or(false)
            }
        })
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystore::doc;

    fn store() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        store.open(&DatabaseConfig::default()).unwrap();
        store
            .insert_one("players", doc! { name: "Alice", coins: 10, level: 2 })
            .unwrap();
        store
            .insert_one("players", doc! { name: "bob", coins: 3, level: 5 })
            .unwrap();
        store
            .insert_one("players", doc! { name: "Carol", coins: 25 })
            .unwrap();
        store
    }

    fn names(docs: &[Document]) -> Vec<String> {
        docs.iter().filter_map(|d| d.get_string("name")).collect()
    }

    #[test]
    fn test_closed_store_rejects_operations() {
        let store = InMemoryDocumentStore::new();
        let err = store.list_collection_names().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConnectionState);
    }

    #[test]
    fn test_insert_assigns_id() {
        let store = store();
        let docs = store.find("players", &Document::new(), None, None).unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs.iter().all(|d| d.get_uuid("_id").is_some()));

        store
            .insert_one("players", doc! { "_id": "fixed", name: "Dan" })
            .unwrap();
        let dan = store
            .find("players", &doc! { name: "Dan" }, None, None)
            .unwrap();
        assert_eq!(dan[0].get_string("_id"), Some("fixed".to_string()));
    }

    #[test]
    fn test_comparison_operators() {
        let store = store();
        let rich = store
            .find("players", &doc! { coins: { "$gte": 10 } }, None, None)
            .unwrap();
        assert_eq!(names(&rich), vec!["Alice", "Carol"]);

        let not_alice = store
            .find("players", &doc! { name: { "$ne": "Alice" } }, None, None)
            .unwrap();
        assert_eq!(names(&not_alice), vec!["bob", "Carol"]);

        let low = store
            .find("players", &doc! { level: { "$lt": 5 } }, None, None)
            .unwrap();
        assert_eq!(names(&low), vec!["Alice"]);
    }

    #[test]
    fn test_missing_field_equals_null() {
        let store = store();
        let docs = store
            .find("players", &doc! { level: { "$eq": (Value::Null) } }, None, None)
            .unwrap();
        assert_eq!(names(&docs), vec!["Carol"]);
    }

    #[test]
    fn test_not_equals_skips_missing_field() {
        let store = store();
        let docs = store
            .find("players", &doc! { level: { "$ne": 2 } }, None, None)
            .unwrap();
        assert_eq!(names(&docs), vec!["bob"]);

        let with_level = store
            .find("players", &doc! { level: { "$ne": (Value::Null) } }, None, None)
            .unwrap();
        assert_eq!(names(&with_level), vec!["Alice", "bob"]);
    }

    #[test]
    fn test_equality_across_number_families() {
        let store = store();
        let bounded = store
            .find("players", &doc! { coins: { "$gte": 10.0, "$lte": 10.0 } }, None, None)
            .unwrap();
        assert_eq!(names(&bounded), vec!["Alice"]);
        let exact = store
            .find("players", &doc! { coins: { "$eq": 10.0 } }, None, None)
            .unwrap();
        assert_eq!(names(&exact), vec!["Alice"]);
        let others = store
            .find("players", &doc! { coins: { "$ne": 10.0 } }, None, None)
            .unwrap();
        assert_eq!(names(&others), vec!["bob", "Carol"]);
    }

    #[test]
    fn test_regex_with_options() {
        let store = store();
        let filter = doc! { name: { "$regex": "^BOB$", "$options": "i" } };
        let docs = store.find("players", &filter, None, None).unwrap();
        assert_eq!(names(&docs), vec!["bob"]);

        let filter = doc! { name: { "$regex": "^BOB$" } };
        assert!(store.find("players", &filter, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let store = store();
        let filter = doc! { name: { "$regex": "(" } };
        let err = store.find("players", &filter, None, None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_unknown_operator_is_unsupported() {
        let store = store();
        let filter = doc! { name: { "$in": ["a"] } };
        let err = store.find("players", &filter, None, None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_projection_and_sort() {
        let store = store();
        let docs = store
            .find(
                "players",
                &Document::new(),
                Some(&doc! { name: 1 }),
                Some(&doc! { coins: (-1) }),
            )
            .unwrap();
        assert_eq!(names(&docs), vec!["Carol", "Alice", "bob"]);
        assert!(docs.iter().all(|d| d.size() == 2 && d.contains("_id")));

        let without_id = store
            .find("players", &Document::new(), Some(&doc! { name: 1, "_id": 0 }), None)
            .unwrap();
        assert!(without_id.iter().all(|d| d.size() == 1));
    }

    #[test]
    fn test_sort_puts_missing_first() {
        let store = store();
        let docs = store
            .find("players", &Document::new(), None, Some(&doc! { level: 1 }))
            .unwrap();
        assert_eq!(names(&docs), vec!["Carol", "Alice", "bob"]);
    }

    #[test]
    fn test_update_many() {
        let store = store();
        let matched = store
            .update_many(
                "players",
                &doc! { coins: { "$lt": 20 } },
                &doc! { "$set": { coins: 0, vip: false } },
            )
            .unwrap();
        assert_eq!(matched, 2);

        let broke = store
            .find("players", &doc! { coins: { "$eq": 0 } }, None, None)
            .unwrap();
        assert_eq!(names(&broke), vec!["Alice", "bob"]);
        assert!(broke.iter().all(|d| d.contains("vip")));
    }

    #[test]
    fn test_unsupported_update_operator() {
        let store = store();
        let err = store
            .update_many("players", &Document::new(), &doc! { "$inc": { coins: 1 } })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_delete_many() {
        let store = store();
        let removed = store
            .delete_many("players", &doc! { coins: { "$gt": 5 } })
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count("players"), 1);
        assert_eq!(store.delete_many("nothing", &Document::new()).unwrap(), 0);
    }

    #[test]
    fn test_collections() {
        let store = store();
        store.create_collection("audit").unwrap();
        assert_eq!(
            store.list_collection_names().unwrap(),
            vec!["audit".to_string(), "players".to_string()]
        );
        assert!(store.create_collection("audit").is_err());
    }

    #[test]
    fn test_data_survives_reopen() {
        let store = store();
        store.close().unwrap();
        assert!(!store.is_open());
        store.open(&DatabaseConfig::default()).unwrap();
        assert_eq!(store.count("players"), 3);
    }
}
