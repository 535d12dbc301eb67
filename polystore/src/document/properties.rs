use crate::common::Value;
use crate::document::Document;
use crate::errors::{ErrorKind, PolyError, PolyResult};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// A flat document backed by `key=value` properties text.
///
/// Every value is held as a string and read back through the same forgiving
/// getters as [Document], so `"42"` reads as `42` from [get_i32] and
/// `"true"` as `true` from [get_bool]. There is no nesting: [get_document]
/// and [get_list] fail with [ErrorKind::UnsupportedOperation], and so does
/// storing a document, list or byte value.
///
/// The text format follows the common properties conventions: `#` and `!`
/// start comment lines, keys and values are separated by `=`, `:` or
/// whitespace, a trailing backslash continues the line and backslash
/// escapes (including `\uXXXX`) are decoded. Output is UTF-8.
///
/// ```rust
/// use polystore::document::PropertiesDocument;
///
/// let mut props = PropertiesDocument::parse("# server\nhost = db.local\nport: 5432\n").unwrap();
/// assert_eq!(props.get_string("host"), Some("db.local".to_string()));
/// assert_eq!(props.get_i32("port"), 5432);
///
/// props.set("pool", 4).unwrap();
/// assert_eq!(props.to_properties_string(), "host=db.local\nport=5432\npool=4\n");
/// ```
///
/// [get_i32]: PropertiesDocument::get_i32
/// [get_bool]: PropertiesDocument::get_bool
/// [get_document]: PropertiesDocument::get_document
/// [get_list]: PropertiesDocument::get_list
#[derive(Clone, Default, PartialEq)]
pub struct PropertiesDocument {
    entries: Document,
}

fn unsupported(message: &str) -> PolyError {
    log::error!("{}", message);
    PolyError::new(message, ErrorKind::UnsupportedOperation)
}

macro_rules! delegate_getters {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            pub fn $name(&self, key: &str $(, $arg: $ty)*) -> $ret {
                self.entries.$name(key $(, $arg)*)
            }
        )*
    };
}

impl PropertiesDocument {
    pub fn new() -> Self {
        PropertiesDocument {
            entries: Document::new(),
        }
    }

    /// Parses properties text.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::EncodingError] on a malformed `\uXXXX` escape.
    pub fn parse(text: &str) -> PolyResult<PropertiesDocument> {
        let mut document = PropertiesDocument::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            let key = unescape(key)?;
            let value = unescape(value)?;
            document.entries.set(&key, value)?;
        }
        Ok(document)
    }

    /// Reads and parses a properties file.
    pub fn load<P: AsRef<Path>>(path: P) -> PolyResult<PropertiesDocument> {
        let text = fs::read_to_string(path.as_ref()).map_err(|err| {
            log::error!("Failed to read {}: {}", path.as_ref().display(), err);
            PolyError::from(err)
        })?;
        PropertiesDocument::parse(&text)
    }

    /// Writes the properties to a file, replacing its content.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PolyResult<()> {
        let file = fs::File::create(path.as_ref()).map_err(|err| {
            log::error!("Failed to create {}: {}", path.as_ref().display(), err);
            PolyError::from(err)
        })?;
        self.write(file)
    }

    /// Writes one `key=value` line per entry, in insertion order.
    pub fn write<W: Write>(&self, mut writer: W) -> PolyResult<()> {
        writer.write_all(self.to_properties_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_properties_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.entries.iter() {
            let value = value.to_text().unwrap_or_default();
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(&value, false));
            out.push('\n');
        }
        out
    }

    /// Stores a scalar in its string form. [Value::Null] removes the key.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::UnsupportedOperation] for document, list and byte values.
    /// * [ErrorKind::InvalidOperation] if the key is empty.
    pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) -> PolyResult<&mut Self> {
        let value = value.into();
        if value.is_null() {
            self.entries.remove(key)?;
            return Ok(self);
        }
        match value.to_text() {
            Some(text) => {
                self.entries.set(key, text)?;
                Ok(self)
            }
            None => Err(unsupported(&format!(
                "Properties cannot hold a {} value",
                value.type_name()
            ))),
        }
    }

    pub fn remove(&mut self, key: &str) -> PolyResult<Option<String>> {
        Ok(self.entries.remove(key)?.and_then(|value| value.to_text()))
    }

    pub fn clear(&mut self) -> PolyResult<()> {
        self.entries.clear()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn size(&self) -> usize {
        self.entries.size()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    delegate_getters! {
        get_string() -> Option<String>;
        get_string_or(default: &str) -> String;
        get_char() -> char;
        get_char_or(default: char) -> char;
        get_i64() -> i64;
        get_i64_or(default: i64) -> i64;
        get_i32() -> i32;
        get_i32_or(default: i32) -> i32;
        get_i16() -> i16;
        get_i16_or(default: i16) -> i16;
        get_i8() -> i8;
        get_i8_or(default: i8) -> i8;
        get_f64() -> f64;
        get_f64_or(default: f64) -> f64;
        get_f32() -> f32;
        get_f32_or(default: f32) -> f32;
        get_bool() -> bool;
        get_bool_or(default: bool) -> bool;
        get_uuid() -> Option<Uuid>;
        get_uuid_or(default: Uuid) -> Uuid;
    }

    pub fn get_enum<E: FromStr>(&self, key: &str) -> Option<E> {
        self.entries.get_enum(key)
    }

    pub fn get_enum_or<E: FromStr>(&self, key: &str, default: E) -> E {
        self.entries.get_enum_or(key, default)
    }

    /// Always fails: properties have no nested documents.
    pub fn get_document(&self, key: &str) -> PolyResult<Document> {
        Err(unsupported(&format!(
            "Properties have no nested document at '{}'",
            key
        )))
    }

    /// Always fails: properties have no list values.
    pub fn get_list(&self, key: &str) -> PolyResult<Vec<String>> {
        Err(unsupported(&format!("Properties have no list at '{}'", key)))
    }

    /// A read-only [Document] with every value as a string.
    pub fn to_document(&self) -> Document {
        self.entries.clone().into_readonly()
    }

    pub fn to_json(&self) -> String {
        self.entries.to_json()
    }
}

impl Debug for PropertiesDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PropertiesDocument({:?})", self.entries)
    }
}

// joins continuation lines and drops blanks and comments
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;
    for raw in text.lines() {
        let trimmed = raw.trim_start();
        let mut line = match current.take() {
            Some(mut pending) => {
                pending.push_str(trimmed);
                pending
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            line.pop();
            current = Some(line);
        } else {
            lines.push(line);
        }
    }
    if let Some(line) = current {
        lines.push(line);
    }
    lines
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                break;
            }
            c if c.is_whitespace() => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if rest.starts_with('=') || rest.starts_with(':') {
        rest = rest[1..].trim_start();
    }
    (key, rest)
}

fn unescape(text: &str) -> PolyResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => out.push(decoded),
                    None => {
                        log::error!("Malformed \\uXXXX escape '\\u{}'", hex);
                        return Err(PolyError::new(
                            &format!("Malformed \\uXXXX escape '\\u{}'", hex),
                            ErrorKind::EncodingError,
                        ));
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000C}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || index == 0 => out.push_str("\\ "),
            c => out.push(c),
        }
    }
    out
}
