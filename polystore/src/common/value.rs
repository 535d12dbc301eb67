use crate::document::Document;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Compare two floats, treating NaN as greater than all other values.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// A dynamically typed value stored in a [Document].
///
/// The variants cover everything the document model exchanges with a
/// backend: scalars, identifiers, nested documents and lists. Enumerations
/// are stored by name as [Value::String] and read back through
/// [Document::get_enum].
///
/// Integer variants compare equal across widths (`I32(5) == I64(5)`), and
/// float variants compare equal across widths at the narrower precision,
/// so that a value survives a trip through a backend or through JSON even
/// when the backend widens it.
///
/// ```text
/// let v1: Value = 42.into();
/// let v2 = Value::from("hello");
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    /// A UUID identifier. Serialized as its hyphenated string form.
    Uuid(Uuid),
    /// A nested document.
    Document(Document),
    /// A list of values.
    Array(Vec<Value>),
    /// Raw binary data (BLOB columns). Serialized as an array of integers.
    Bytes(Vec<u8>),
}

impl Value {
    /// Creates a new [Value] from anything that converts into one.
    pub fn from<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    /// Creates a [Value::Array] from a vector of convertible values.
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(|v| v.into()).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Checks whether the value belongs to the integer family.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_))
    }

    /// Checks whether the value belongs to the floating point family.
    pub fn is_decimal(&self) -> bool {
        matches!(self, Value::F32(_) | Value::F64(_))
    }

    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_decimal()
    }

    /// Checks whether the value is a scalar, i.e. not a document, list or byte array.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Value::Document(_) | Value::Array(_) | Value::Bytes(_)
        )
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&char> {
        match self {
            Value::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Value::Uuid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Vec<u8>> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Widens any integer variant to `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens any float variant to `f64`.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any numeric value as `f64`.
    pub fn as_f64_lossy(&self) -> Option<f64> {
        self.as_integer()
            .map(|v| v as f64)
            .or_else(|| self.as_decimal())
    }

    /// Returns the textual form of a scalar value, the way it is read back
    /// from a text column. Documents, lists, bytes and null have none.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(v) => Some(v.to_string()),
            Value::I8(v) => Some(v.to_string()),
            Value::I16(v) => Some(v.to_string()),
            Value::I32(v) => Some(v.to_string()),
            Value::I64(v) => Some(v.to_string()),
            Value::F32(v) => Some(v.to_string()),
            Value::F64(v) => Some(v.to_string()),
            Value::Char(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Uuid(v) => Some(v.hyphenated().to_string()),
            _ => None,
        }
    }

    /// The name of the variant, used in log and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::Document(_) => "document",
            Value::Array(_) => "array",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Orders two values of compatible kinds.
    ///
    /// Numbers compare numerically across the integer and float families.
    /// Strings, chars, booleans and UUIDs compare within their own kind.
    /// Returns `None` for incompatible kinds, which comparison filters treat
    /// as "no match".
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_integer(), other.as_integer()) {
            return Some(a.cmp(&b));
        }
        if self.is_number() && other.is_number() {
            let a = self.as_f64_lossy()?;
            let b = other.as_f64_lossy()?;
            return Some(num_cmp_float(a, b));
        }

        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as filters evaluate it. Numbers also match across the
    /// integer and float families, so `I64(5)` matches `F64(5.0)`.
    pub fn query_eq(&self, other: &Value) -> bool {
        if self == other {
            return true;
        }
        self.is_number() && other.is_number() && self.compare(other) == Some(Ordering::Equal)
    }

    /// Converts to the JSON model used by the serialization codec.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
                serde_json::Value::from(self.as_integer().unwrap_or_default())
            }
            // shortest representation of the f32, so 0.1f32 is written as 0.1
            Value::F32(v) => v
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Char(v) => serde_json::Value::String(v.to_string()),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Uuid(v) => serde_json::Value::String(v.hyphenated().to_string()),
            Value::Document(doc) => doc.to_json_value(),
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(|v| v.to_json_value()).collect())
            }
            Value::Bytes(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
        }
    }

    /// Converts from the JSON model. Integers become [Value::I64], other
    /// numbers [Value::F64] and objects mutable [Document]s.
    pub fn from_json_value(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Value::I64(v),
                None => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(v) => Value::String(v),
            serde_json::Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::from_json_value).collect())
            }
            serde_json::Value::Object(map) => Value::Document(Document::from_json_map(map)),
        }
    }

    pub(crate) fn to_debug_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => format!("bool({})", v),
            Value::I8(v) => format!("i8({})", v),
            Value::I16(v) => format!("i16({})", v),
            Value::I32(v) => format!("i32({})", v),
            Value::I64(v) => format!("i64({})", v),
            Value::F32(v) => format!("f32({})", v),
            Value::F64(v) => format!("f64({})", v),
            Value::Char(v) => format!("char(\"{}\")", v),
            Value::String(v) => format!("string(\"{}\")", v),
            Value::Uuid(v) => format!("uuid(\"{}\")", v),
            Value::Document(v) => format!("document({:?})", v),
            Value::Array(v) => format!(
                "array([{}])",
                v.iter()
                    .map(|it| it.to_debug_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Bytes(v) => format!("bytes({} bytes)", v.len()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_integer(), other.as_integer()) {
            return a == b;
        }

        match (self, other) {
            // compare at the narrower precision when one side is an f32
            (Value::F32(a), Value::F32(b)) => num_eq_float(*a as f64, *b as f64),
            (Value::F32(a), Value::F64(b)) | (Value::F64(b), Value::F32(a)) => {
                num_eq_float(*a as f64, (*b as f32) as f64)
            }
            (Value::F64(a), Value::F64(b)) => num_eq_float(*a, *b),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "{}", self.to_json_value()),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    #[inline]
    fn from(value: i8) -> Self {
        Value::I8(value)
    }
}

impl From<u8> for Value {
    #[inline]
    fn from(value: u8) -> Self {
        Value::I16(value as i16)
    }
}

impl From<i16> for Value {
    #[inline]
    fn from(value: i16) -> Self {
        Value::I16(value)
    }
}

impl From<u16> for Value {
    #[inline]
    fn from(value: u16) -> Self {
        Value::I32(value as i32)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(value: u32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<char> for Value {
    #[inline]
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Uuid> for Value {
    #[inline]
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<Document> for Value {
    #[inline]
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::from_vec(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
