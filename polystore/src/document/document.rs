use crate::common::Value;
use crate::errors::{ErrorKind, PolyError, PolyResult};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DocumentMode {
    #[default]
    Mutable,
    ReadOnly,
    /// The null-object document: always empty, never writable.
    Empty,
}

/// An ordered, hierarchical key-value document.
///
/// Keys are unique strings kept in insertion order and values are [Value]s,
/// which may themselves be nested documents or lists. A key that is absent
/// is distinct from a key holding [Value::Null].
///
/// Reads never fail. Every typed getter has a plain form that returns the
/// type's zero value when the key is absent or the value cannot be coerced,
/// and an `_or` form that returns the caller's default instead.
///
/// A document is either mutable, read-only or the null object returned by
/// [Document::empty]. Writes to the latter two fail with
/// [ErrorKind::UnsupportedOperation] at the call site. Query results are
/// always read-only.
///
/// # Examples
///
/// ```rust
/// use polystore::doc;
///
/// let mut doc = doc! { name: "Alice", age: 30 };
/// doc.set("city", "Berlin").unwrap();
///
/// assert_eq!(doc.get_i32("age"), 30);
/// assert_eq!(doc.get_i32("missing"), 0);
/// assert_eq!(doc.get_i32_or("missing", 7), 7);
/// assert_eq!(doc.to_json(), r#"{"name":"Alice","age":30,"city":"Berlin"}"#);
/// ```
#[derive(Clone, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
    mode: DocumentMode,
}

impl Document {
    /// Creates a new empty mutable document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
            mode: DocumentMode::Mutable,
        }
    }

    /// Returns the null-object document.
    ///
    /// Every read on it yields the zero value or the supplied default and
    /// every write fails with [ErrorKind::UnsupportedOperation].
    pub fn empty() -> Self {
        Document {
            data: IndexMap::new(),
            mode: DocumentMode::Empty,
        }
    }

    /// Parses a JSON object into a mutable document.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::EncodingError] if the text is not valid JSON or
    /// its top level is not an object.
    pub fn parse(json: &str) -> PolyResult<Document> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|err| {
            log::error!("Failed to parse document json: {}", err);
            PolyError::from(err)
        })?;

        match value {
            serde_json::Value::Object(map) => Ok(Document::from_json_map(map)),
            other => {
                log::error!("Document json must be an object, found {}", other);
                Err(PolyError::new(
                    "Document json must be an object",
                    ErrorKind::EncodingError,
                ))
            }
        }
    }

    /// Parses a JSON object into a read-only document.
    pub fn parse_readonly(json: &str) -> PolyResult<Document> {
        Document::parse(json).map(|doc| doc.into_readonly())
    }

    pub(crate) fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Document {
        map.into_iter()
            .map(|(key, value)| (key, Value::from_json_value(value)))
            .collect()
    }

    /// Converts this document into a read-only one. The null object stays
    /// the null object.
    pub fn into_readonly(mut self) -> Document {
        if self.mode == DocumentMode::Mutable {
            self.mode = DocumentMode::ReadOnly;
        }
        self
    }

    /// Checks if writes to this document are rejected.
    pub fn is_readonly(&self) -> bool {
        self.mode != DocumentMode::Mutable
    }

    /// Checks if this is the null-object document.
    pub fn is_null_object(&self) -> bool {
        self.mode == DocumentMode::Empty
    }

    fn check_writable(&self, operation: &str) -> PolyResult<()> {
        match self.mode {
            DocumentMode::Mutable => Ok(()),
            DocumentMode::ReadOnly => {
                log::error!("Cannot {} a read-only document", operation);
                Err(PolyError::new(
                    &format!("Cannot {} a read-only document", operation),
                    ErrorKind::UnsupportedOperation,
                ))
            }
            DocumentMode::Empty => {
                log::error!("Cannot {} an empty document", operation);
                Err(PolyError::new(
                    &format!("Cannot {} an empty document", operation),
                    ErrorKind::UnsupportedOperation,
                ))
            }
        }
    }

    /// Associates a value with a top-level key, replacing any previous value
    /// while keeping the key's original position.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::UnsupportedOperation] if the document is read-only.
    /// * [ErrorKind::InvalidOperation] if the key is empty.
    pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) -> PolyResult<&mut Self> {
        self.check_writable("set a value in")?;
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(PolyError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Removes a key, returning the value it held.
    pub fn remove(&mut self, key: &str) -> PolyResult<Option<Value>> {
        self.check_writable("remove a key from")?;
        Ok(self.data.shift_remove(key))
    }

    /// Removes every key.
    pub fn clear(&mut self) -> PolyResult<()> {
        self.check_writable("clear")?;
        self.data.clear();
        Ok(())
    }

    /// Copies every entry of `other` into this document, overwriting keys
    /// that already exist.
    pub fn merge(&mut self, other: &Document) -> PolyResult<()> {
        self.check_writable("merge into")?;
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Writes the document as pretty printed JSON.
    ///
    /// Only mutable documents can be written.
    pub fn write<W: Write>(&self, mut writer: W) -> PolyResult<()> {
        self.check_writable("write")?;
        writer.write_all(self.to_pretty_json().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Checks if a top-level key is present, even when it holds null.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of top-level keys.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Returns an ordered snapshot of every top-level entry.
    pub fn values(&self) -> IndexMap<String, Value> {
        self.data.clone()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    pub fn for_each<F: FnMut(&str, &Value)>(&self, mut f: F) {
        for (key, value) in self.data.iter() {
            f(key, value);
        }
    }

    /// Gets the raw value of a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets an owned copy of the raw value of a key.
    pub fn get_object(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    /// Gets any scalar as its string form.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|value| value.to_text())
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn try_char(&self, key: &str) -> Option<char> {
        match self.get(key)? {
            Value::Char(c) => Some(*c),
            Value::String(s) => s.chars().next(),
            _ => None,
        }
    }

    pub fn get_char(&self, key: &str) -> char {
        self.get_char_or(key, '\0')
    }

    pub fn get_char_or(&self, key: &str, default: char) -> char {
        self.try_char(key).unwrap_or(default)
    }

    fn try_i64(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        if let Some(v) = value.as_integer() {
            return Some(v);
        }
        if let Some(v) = value.as_decimal() {
            return truncate_f64(v);
        }
        match value {
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate_f64))
            }
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.get_i64_or(key, 0)
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.try_i64(key).unwrap_or(default)
    }

    pub fn get_i32(&self, key: &str) -> i32 {
        self.get_i32_or(key, 0)
    }

    pub fn get_i32_or(&self, key: &str, default: i32) -> i32 {
        self.try_i64(key)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(default)
    }

    pub fn get_i16(&self, key: &str) -> i16 {
        self.get_i16_or(key, 0)
    }

    pub fn get_i16_or(&self, key: &str, default: i16) -> i16 {
        self.try_i64(key)
            .and_then(|v| i16::try_from(v).ok())
            .unwrap_or(default)
    }

    pub fn get_i8(&self, key: &str) -> i8 {
        self.get_i8_or(key, 0)
    }

    pub fn get_i8_or(&self, key: &str, default: i8) -> i8 {
        self.try_i64(key)
            .and_then(|v| i8::try_from(v).ok())
            .unwrap_or(default)
    }

    fn try_f64(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        match value {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            // f32 goes through its shortest text so 0.1f32 reads back as 0.1
            Value::F32(v) => v.to_string().parse::<f64>().ok(),
            _ => value.as_f64_lossy(),
        }
    }

    pub fn get_f64(&self, key: &str) -> f64 {
        self.get_f64_or(key, 0.0)
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.try_f64(key).unwrap_or(default)
    }

    pub fn get_f32(&self, key: &str) -> f32 {
        self.get_f32_or(key, 0.0)
    }

    pub fn get_f32_or(&self, key: &str, default: f32) -> f32 {
        self.try_f64(key).map(|v| v as f32).unwrap_or(default)
    }

    fn try_bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        if let Some(v) = value.as_integer() {
            return Some(v != 0);
        }
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_bool_or(key, false)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.try_bool(key).unwrap_or(default)
    }

    /// Gets a UUID, parsing it from a string if needed.
    pub fn get_uuid(&self, key: &str) -> Option<Uuid> {
        match self.get(key)? {
            Value::Uuid(id) => Some(*id),
            Value::String(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn get_uuid_or(&self, key: &str, default: Uuid) -> Uuid {
        self.get_uuid(key).unwrap_or(default)
    }

    /// Gets an enumeration stored by name.
    ///
    /// ```rust
    /// use polystore::doc;
    /// use std::str::FromStr;
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum Rank { Admin, Member }
    ///
    /// impl FromStr for Rank {
    ///     type Err = ();
    ///     fn from_str(s: &str) -> Result<Self, ()> {
    ///         match s {
    ///             "ADMIN" => Ok(Rank::Admin),
    ///             "MEMBER" => Ok(Rank::Member),
    ///             _ => Err(()),
    ///         }
    ///     }
    /// }
    ///
    /// let doc = doc! { rank: "ADMIN" };
    /// assert_eq!(doc.get_enum::<Rank>("rank"), Some(Rank::Admin));
    /// assert_eq!(doc.get_enum_or("other", Rank::Member), Rank::Member);
    /// ```
    pub fn get_enum<E: FromStr>(&self, key: &str) -> Option<E> {
        self.get_string(key).and_then(|s| E::from_str(&s).ok())
    }

    pub fn get_enum_or<E: FromStr>(&self, key: &str, default: E) -> E {
        self.get_enum(key).unwrap_or(default)
    }

    /// Gets a nested document.
    ///
    /// A string value is parsed as document JSON and returned read-only.
    /// Anything else, including unparsable text, yields [Document::empty].
    pub fn get_document(&self, key: &str) -> Document {
        match self.get(key) {
            Some(Value::Document(doc)) => doc.clone(),
            Some(Value::String(s)) => match Document::parse_readonly(s) {
                Ok(doc) => doc,
                Err(err) => {
                    log::warn!("Value of '{}' is not a document: {}", key, err);
                    Document::empty()
                }
            },
            _ => Document::empty(),
        }
    }

    fn try_list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            Value::Array(values) => Some(values.iter().filter_map(|v| v.to_text()).collect()),
            Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {
                Ok(serde_json::Value::Array(values)) => Some(
                    values
                        .into_iter()
                        .filter_map(|v| Value::from_json_value(v).to_text())
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// Gets a list of scalars in string form.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.try_list(key).unwrap_or_default()
    }

    pub fn get_list_or(&self, key: &str, default: Vec<String>) -> Vec<String> {
        self.try_list(key).unwrap_or(default)
    }

    /// Converts to the JSON model, keeping key order.
    pub fn to_json_value(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .data
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json_value()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Serializes to compact canonical JSON.
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Serializes to indented JSON.
    pub fn to_pretty_json(&self) -> String {
        format!("{:#}", self.to_json_value())
    }

    fn to_debug_string(&self) -> String {
        let entries = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}\": {:?}", key, value))
            .join(", ");
        format!("{{{}}}", entries)
    }
}

fn truncate_f64(value: f64) -> Option<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document {
            data: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            mode: DocumentMode::Mutable,
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// Strips the quotes `stringify!` leaves around string literal keys.
#[doc(hidden)]
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a mutable [Document] with JSON-like syntax.
///
/// Keys may be bare identifiers or string literals. Values may be any
/// expression convertible into a [Value], a nested `{ ... }` document or a
/// `[ ... ]` list.
///
/// # Examples
///
/// ```rust
/// use polystore::doc;
///
/// let empty = doc!{};
/// assert!(empty.is_empty());
///
/// let player = doc! {
///     name: "Alice",
///     "level": 12,
///     stats: { hp: 100, mp: 40 },
///     tags: ["pvp", "guild"],
/// };
/// assert_eq!(player.get_document("stats").get_i32("hp"), 100);
/// assert_eq!(player.get_list("tags"), vec!["pvp", "guild"]);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::document::Document::new()
    };

    ({}) => {
        $crate::document::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let entries: Vec<(String, $crate::common::Value)> = vec![
                $(($crate::document::normalize(stringify!($key)), $crate::doc_value!($value))),*
            ];
            entries.into_iter().collect::<$crate::document::Document>()
        }
    };
}

/// Converts a single `doc!` value.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn sample() -> Document {
        doc! {
            name: "Alice",
            age: 30,
            score: 12.5,
            active: true,
            nothing: (Value::Null),
            address: { city: "Berlin", zip: 10115 },
            tags: ["a", "b"],
        }
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let doc = sample();
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(
            keys,
            vec!["name", "age", "score", "active", "nothing", "address", "tags"]
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut doc = doc! { a: 1, b: 2 };
        doc.set("a", 10).unwrap().set("c", 3).unwrap();
        assert_eq!(doc.to_json(), r#"{"a":10,"b":2,"c":3}"#);
    }

    #[test]
    fn test_set_empty_key_fails() {
        let mut doc = Document::new();
        let err = doc.set("", 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_absent_key_is_distinct_from_null() {
        let doc = sample();
        assert!(doc.contains("nothing"));
        assert_eq!(doc.get("nothing"), Some(&Value::Null));
        assert!(!doc.contains("missing"));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_missing_keys_yield_zero_values() {
        let doc = Document::new();
        assert_eq!(doc.get_string("k"), None);
        assert_eq!(doc.get_i64("k"), 0);
        assert_eq!(doc.get_i32("k"), 0);
        assert_eq!(doc.get_i16("k"), 0);
        assert_eq!(doc.get_i8("k"), 0);
        assert_eq!(doc.get_f64("k"), 0.0);
        assert_eq!(doc.get_f32("k"), 0.0);
        assert!(!doc.get_bool("k"));
        assert_eq!(doc.get_char("k"), '\0');
        assert_eq!(doc.get_uuid("k"), None);
        assert!(doc.get_document("k").is_null_object());
        assert!(doc.get_list("k").is_empty());
    }

    #[test]
    fn test_missing_keys_yield_exact_defaults() {
        let doc = Document::new();
        let id = Uuid::new_v4();
        assert_eq!(doc.get_string_or("k", "dflt"), "dflt");
        assert_eq!(doc.get_i64_or("k", -9), -9);
        assert_eq!(doc.get_i32_or("k", 42), 42);
        assert_eq!(doc.get_i16_or("k", 7), 7);
        assert_eq!(doc.get_i8_or("k", -1), -1);
        assert_eq!(doc.get_f64_or("k", 1.5), 1.5);
        assert_eq!(doc.get_f32_or("k", 2.5), 2.5);
        assert!(doc.get_bool_or("k", true));
        assert_eq!(doc.get_char_or("k", 'z'), 'z');
        assert_eq!(doc.get_uuid_or("k", id), id);
        assert_eq!(doc.get_list_or("k", vec!["x".to_string()]), vec!["x"]);
    }

    #[test]
    fn test_coercion_failure_yields_default() {
        let doc = doc! { name: "Alice", big: 100000 };
        assert_eq!(doc.get_i32("name"), 0);
        assert_eq!(doc.get_i32_or("name", 5), 5);
        assert_eq!(doc.get_i16_or("big", -1), -1);
        assert_eq!(doc.get_bool_or("name", true), true);
    }

    #[test]
    fn test_numeric_coercions() {
        let doc = doc! { i: 5, f: 2.9, s: " 17 ", fs: "3.75", small: 0.1_f32 };
        assert_eq!(doc.get_i64("i"), 5);
        assert_eq!(doc.get_i32("f"), 2);
        assert_eq!(doc.get_i32("s"), 17);
        assert_eq!(doc.get_i32("fs"), 3);
        assert_eq!(doc.get_f64("i"), 5.0);
        assert_eq!(doc.get_f64("fs"), 3.75);
        assert_eq!(doc.get_f64("small"), 0.1);
    }

    #[test]
    fn test_string_coercion_from_scalars() {
        let doc = doc! { i: 5, b: true, c: 'x' };
        assert_eq!(doc.get_string("i"), Some("5".to_string()));
        assert_eq!(doc.get_string("b"), Some("true".to_string()));
        assert_eq!(doc.get_string("c"), Some("x".to_string()));
        assert_eq!(sample().get_string("address"), None);
    }

    #[test]
    fn test_bool_coercions() {
        let doc = doc! { t: "TRUE", f: "false", one: 1, zero: 0 };
        assert!(doc.get_bool("t"));
        assert!(!doc.get_bool_or("f", true));
        assert!(doc.get_bool("one"));
        assert!(!doc.get_bool_or("zero", true));
    }

    #[test]
    fn test_char_and_uuid_coercions() {
        let id = Uuid::new_v4();
        let doc = doc! { c: "hello", raw: (id.to_string()), typed: id };
        assert_eq!(doc.get_char("c"), 'h');
        assert_eq!(doc.get_uuid("raw"), Some(id));
        assert_eq!(doc.get_uuid("typed"), Some(id));
        assert_eq!(doc.get_uuid("c"), None);
    }

    #[test]
    fn test_get_document_nested_and_from_string() {
        let doc = doc! {
            nested: { a: 1 },
            text: r#"{"b": 2}"#,
            broken: "{not json",
        };
        assert_eq!(doc.get_document("nested").get_i32("a"), 1);

        let parsed = doc.get_document("text");
        assert!(parsed.is_readonly());
        assert_eq!(parsed.get_i32("b"), 2);

        let broken = doc.get_document("broken");
        assert!(broken.is_null_object());
        assert_eq!(broken.get_i32_or("b", 4), 4);
    }

    #[test]
    fn test_get_list_from_array_and_string() {
        let doc = doc! { arr: [1, "two", 3.5], text: r#"["x", "y"]"#, bad: "nope" };
        assert_eq!(doc.get_list("arr"), vec!["1", "two", "3.5"]);
        assert_eq!(doc.get_list("text"), vec!["x", "y"]);
        assert!(doc.get_list("bad").is_empty());
    }

    #[test]
    fn test_json_round_trip_of_scalar_document() {
        let doc = doc! {
            s: "text",
            i: 42,
            neg: (-7_i64),
            f: 3.25,
            b: false,
            n: (Value::Null),
        };
        let parsed = Document::parse(&doc.to_json()).unwrap();
        assert_eq!(parsed.values(), doc.values());
    }

    #[test]
    fn test_canonical_json() {
        let id = Uuid::nil();
        let doc = doc! { c: 'q', id: id, bytes: (Value::Bytes(vec![1, 2])), f: 0.1_f32 };
        assert_eq!(
            doc.to_json(),
            r#"{"c":"q","id":"00000000-0000-0000-0000-000000000000","bytes":[1,2],"f":0.1}"#
        );
    }

    #[test]
    fn test_parse_maps_numbers() {
        let doc = Document::parse(r#"{"i": 3, "f": 1.5, "o": {"x": [1]}}"#).unwrap();
        assert!(matches!(doc.get("i"), Some(Value::I64(3))));
        assert!(matches!(doc.get("f"), Some(Value::F64(_))));
        assert!(doc.get("o").map(|v| v.is_document()).unwrap_or(false));
        assert!(!doc.is_readonly());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Document::parse("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
        let err = Document::parse("{oops").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn test_readonly_rejects_writes_and_keeps_reads() {
        let mut doc = sample().into_readonly();
        assert!(doc.is_readonly());
        assert_eq!(doc.set("x", 1).unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert_eq!(doc.clear().unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert_eq!(doc.remove("age").unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert_eq!(
            doc.write(Vec::new()).unwrap_err().kind(),
            &ErrorKind::UnsupportedOperation
        );
        assert_eq!(doc.get_i32("age"), 30);
        assert_eq!(doc.size(), 7);
    }

    #[test]
    fn test_empty_document_rejects_writes_and_reads_zero() {
        let mut doc = Document::empty();
        assert!(doc.is_readonly());
        assert!(doc.is_null_object());
        assert_eq!(doc.set("x", 1).unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert_eq!(doc.clear().unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert_eq!(doc.remove("x").unwrap_err().kind(), &ErrorKind::UnsupportedOperation);
        assert!(doc.write(Vec::new()).is_err());
        assert_eq!(doc.get_string_or("x", "d"), "d");
        assert_eq!(doc.get_i32("x"), 0);
        assert!(doc.is_empty());
        assert!(doc.into_readonly().is_null_object());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut doc = doc! { a: 1, b: 2, c: 3 };
        assert_eq!(doc.remove("b").unwrap(), Some(Value::I32(2)));
        assert_eq!(doc.remove("b").unwrap(), None);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        doc.clear().unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_merge() {
        let mut doc = doc! { a: 1, b: 2 };
        doc.merge(&doc! { b: 20, c: 30 }).unwrap();
        assert_eq!(doc.to_json(), r#"{"a":1,"b":20,"c":30}"#);
    }

    #[test]
    fn test_write_pretty_json() {
        let doc = doc! { a: 1 };
        let mut buffer = Vec::new();
        doc.write(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_values_snapshot_is_detached() {
        let mut doc = doc! { a: 1 };
        let snapshot = doc.values();
        doc.set("a", 2).unwrap();
        assert_eq!(snapshot.get("a"), Some(&Value::I32(1)));
    }

    #[test]
    fn test_for_each_and_iter() {
        let doc = doc! { a: 1, b: 2 };
        let mut seen = Vec::new();
        doc.for_each(|key, value| seen.push(format!("{}={}", key, value)));
        assert_eq!(seen, vec!["a=1", "b=2"]);
        assert_eq!(doc.iter().count(), 2);
        assert_eq!((&doc).into_iter().count(), 2);
    }

    #[test]
    fn test_equality_ignores_mode() {
        let doc = doc! { a: 1 };
        assert_eq!(doc.clone().into_readonly(), doc);
    }

    #[test]
    fn test_doc_macro_nesting() {
        let doc = sample();
        assert_eq!(doc.get_document("address").get_string("city"), Some("Berlin".to_string()));
        assert_eq!(doc.get_list("tags"), vec!["a", "b"]);
        assert_eq!(format!("{:?}", doc! { a: 1 }), "{\"a\": i32(1)}");
    }
}
