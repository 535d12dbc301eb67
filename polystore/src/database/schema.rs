use crate::errors::{ErrorKind, PolyError, PolyResult};
use std::fmt::{Display, Formatter};

/// Column types understood by `create_table_if_not_exists`.
///
/// Schemaless backends ignore column declarations entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlColumnType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Boolean,
    Char,
    Varchar,
    Text,
    LongText,
    Blob,
}

impl SqlColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlColumnType::TinyInt => "TINYINT",
            SqlColumnType::SmallInt => "SMALLINT",
            SqlColumnType::Int => "INT",
            SqlColumnType::BigInt => "BIGINT",
            SqlColumnType::Float => "FLOAT",
            SqlColumnType::Double => "DOUBLE",
            SqlColumnType::Boolean => "BOOLEAN",
            SqlColumnType::Char => "CHAR",
            SqlColumnType::Varchar => "VARCHAR",
            SqlColumnType::Text => "TEXT",
            SqlColumnType::LongText => "LONGTEXT",
            SqlColumnType::Blob => "BLOB",
        }
    }
}

impl Display for SqlColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// A column declaration: name, type and an optional type parameter such as
/// the length of a `VARCHAR`. The parameter may only hold digits separated
/// by commas, as in `32` or `10,2`.
///
/// ```rust
/// use polystore::database::{SqlColumn, SqlColumnType};
///
/// let column = SqlColumn::new("name", SqlColumnType::Varchar).with_param("32");
/// assert_eq!(column.type_declaration().unwrap(), "VARCHAR(32)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlColumn {
    name: String,
    column_type: SqlColumnType,
    param: Option<String>,
}

impl SqlColumn {
    pub fn new(name: &str, column_type: SqlColumnType) -> Self {
        SqlColumn {
            name: name.to_string(),
            column_type,
            param: None,
        }
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> SqlColumnType {
        self.column_type
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// The type with its parameter, as written after the column name.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidOperation] if the parameter is anything other
    ///   than comma separated digits.
    pub fn type_declaration(&self) -> PolyResult<String> {
        match &self.param {
            Some(param) if is_numeric_list(param) => {
                let param: String = param.chars().filter(|c| !c.is_whitespace()).collect();
                Ok(format!("{}({})", self.column_type.sql_name(), param))
            }
            Some(param) => {
                log::error!("Invalid parameter '{}' for column '{}'", param, self.name);
                Err(PolyError::new(
                    &format!("Invalid parameter '{}' for column '{}'", param, self.name),
                    ErrorKind::InvalidOperation,
                ))
            }
            None => Ok(self.column_type.sql_name().to_string()),
        }
    }
}

fn is_numeric_list(param: &str) -> bool {
    param.split(',').all(|part| {
        let part = part.trim();
        !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
    })
}
