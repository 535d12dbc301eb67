//! Translation of the common operation model into parameterized SQL.
//!
//! Identifiers are always double-quoted and every value travels as a bound
//! `?` parameter, so no caller supplied text is ever spliced into a
//! statement.
use polystore::common::Value;
use polystore::database::{
    DeleteSpec, FilterMap, InsertSpec, QuerySpec, SqlColumn, UpdateSpec,
};
use polystore::errors::{ErrorKind, PolyError, PolyResult};
use polystore::filter::{ComparisonMode, Filter};
use rusqlite::types::Value as SqlValue;

/// Unicode-aware lowercase function registered on every connection.
/// SQLite's built-in `LOWER` folds ASCII letters only.
pub const FOLD_CASE_FUNCTION: &str = "polystore_lower";

/// A SQL statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// Quotes an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts a value to its bound parameter form.
///
/// Booleans become `0`/`1`, UUIDs and chars text, nested documents their
/// JSON text. Lists have no column representation and are rejected.
pub fn to_sql_value(value: &Value) -> PolyResult<SqlValue> {
    let sql_value = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
            SqlValue::Integer(value.as_integer().unwrap_or_default())
        }
        Value::F32(f) => SqlValue::Real(f.to_string().parse::<f64>().unwrap_or(*f as f64)),
        Value::F64(f) => SqlValue::Real(*f),
        Value::Char(c) => SqlValue::Text(c.to_string()),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Uuid(id) => SqlValue::Text(id.hyphenated().to_string()),
        Value::Document(doc) => SqlValue::Text(doc.to_json()),
        Value::Bytes(bytes) => SqlValue::Blob(bytes.clone()),
        Value::Array(_) => {
            log::error!("List values cannot be stored in a SQL column");
            return Err(PolyError::new(
                "List values cannot be stored in a SQL column",
                ErrorKind::UnsupportedOperation,
            ));
        }
    };
    Ok(sql_value)
}

fn compile_filter(filter: &Filter, params: &mut Vec<SqlValue>) -> PolyResult<String> {
    let column = quote_identifier(filter.field_name());
    let clause = match filter {
        Filter::Equals { value, .. } if value.is_null() => format!("{} IS NULL", column),
        Filter::Equals { value, .. } => {
            params.push(to_sql_value(value)?);
            format!("{} = ?", column)
        }
        Filter::StringEquals {
            value, ignore_case, ..
        } => {
            params.push(SqlValue::Text(value.clone()));
            if *ignore_case {
                format!(
                    "{f}({}) = {f}(?)",
                    column,
                    f = FOLD_CASE_FUNCTION
                )
            } else {
                format!("{} = ?", column)
            }
        }
        Filter::Compare {
            mode: ComparisonMode::NotEquals,
            value,
            ..
        } if value.is_null() => format!("{} IS NOT NULL", column),
        Filter::Compare { mode, value, .. } => {
            params.push(to_sql_value(value)?);
            format!("{} {} ?", column, mode.sql_operator())
        }
    };
    Ok(clause)
}

fn compile_where(filters: &FilterMap, params: &mut Vec<SqlValue>) -> PolyResult<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }

    let clauses = filters
        .values()
        .map(|filter| compile_filter(filter, params))
        .collect::<PolyResult<Vec<_>>>()?;
    Ok(format!(" WHERE {}", clauses.join(" AND ")))
}

pub fn compile_query(query: &QuerySpec) -> PolyResult<SqlStatement> {
    let mut params = Vec::new();
    let columns = if query.projection().is_empty() {
        "*".to_string()
    } else {
        let quoted: Vec<String> = query
            .projection()
            .iter()
            .map(|field| quote_identifier(field))
            .collect();
        quoted.join(", ")
    };

    let where_clause = compile_where(query.filters(), &mut params)?;
    let order_clause = match query.order() {
        Some((field, order)) => format!(
            " ORDER BY {} {}",
            quote_identifier(field),
            order.sql_keyword()
        ),
        None => String::new(),
    };

    Ok(SqlStatement {
        sql: format!(
            "SELECT {} FROM {}{}{}",
            columns,
            quote_identifier(query.table()),
            where_clause,
            order_clause
        ),
        params,
    })
}

/// Compiles an update. Returns `None` when there is nothing to assign.
pub fn compile_update(update: &UpdateSpec) -> PolyResult<Option<SqlStatement>> {
    if update.assignments().is_empty() {
        return Ok(None);
    }

    let mut params = Vec::with_capacity(update.assignments().len());
    let mut assignments = Vec::with_capacity(update.assignments().len());
    for (field, value) in update.assignments() {
        params.push(to_sql_value(value)?);
        assignments.push(format!("{} = ?", quote_identifier(field)));
    }

    let where_clause = compile_where(update.filters(), &mut params)?;
    Ok(Some(SqlStatement {
        sql: format!(
            "UPDATE {} SET {}{}",
            quote_identifier(update.table()),
            assignments.join(", "),
            where_clause
        ),
        params,
    }))
}

pub fn compile_insert(insert: &InsertSpec) -> PolyResult<SqlStatement> {
    let table = quote_identifier(insert.table());
    if insert.values().is_empty() {
        return Ok(SqlStatement {
            sql: format!("INSERT INTO {} DEFAULT VALUES", table),
            params: Vec::new(),
        });
    }

    let mut params = Vec::with_capacity(insert.values().len());
    let mut columns = Vec::with_capacity(insert.values().len());
    for (field, value) in insert.values() {
        params.push(to_sql_value(value)?);
        columns.push(quote_identifier(field));
    }
    let placeholders = vec!["?"; columns.len()];

    Ok(SqlStatement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ),
        params,
    })
}

pub fn compile_delete(delete: &DeleteSpec) -> PolyResult<SqlStatement> {
    let mut params = Vec::new();
    let where_clause = compile_where(delete.filters(), &mut params)?;
    Ok(SqlStatement {
        sql: format!(
            "DELETE FROM {}{}",
            quote_identifier(delete.table()),
            where_clause
        ),
        params,
    })
}

pub fn compile_create_table(name: &str, columns: &[SqlColumn]) -> PolyResult<String> {
    if columns.is_empty() {
        log::error!("Table '{}' must declare at least one column", name);
        return Err(PolyError::new(
            &format!("Table '{}' must declare at least one column", name),
            ErrorKind::InvalidOperation,
        ));
    }

    let definitions = columns
        .iter()
        .map(|column| {
            Ok(format!(
                "{} {}",
                quote_identifier(column.name()),
                column.type_declaration()?
            ))
        })
        .collect::<PolyResult<Vec<String>>>()?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(name),
        definitions.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteDatabase;
    use polystore::common::SortOrder;
    use polystore::database::SqlColumnType;
    use polystore::filter::field;
    use polystore::{doc, Database, DatabaseConfig};

    fn database() -> Database {
        Database::new(SqliteDatabase::new(), DatabaseConfig::default())
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("name"), "\"name\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_compile_select_all() {
        let db = database();
        let statement = compile_query(db.query("players").spec()).unwrap();
        assert_eq!(statement.sql(), "SELECT * FROM \"players\"");
        assert!(statement.params().is_empty());
    }

    #[test]
    fn test_compile_query_with_filters_projection_and_order() {
        let db = database();
        let mut query = db.query("players");
        query
            .where_eq("guild", "red")
            .where_ignore_case("name", "Bob", true)
            .filter(field("level").gte(10))
            .select(&["name", "level"])
            .order_by("level", SortOrder::Descending);

        let statement = compile_query(query.spec()).unwrap();
        assert_eq!(
            statement.sql(),
            "SELECT \"name\", \"level\" FROM \"players\" WHERE \"guild\" = ? AND polystore_lower(\"name\") = polystore_lower(?) AND \"level\" >= ? ORDER BY \"level\" DESC"
        );
        assert_eq!(
            statement.params(),
            &[
                SqlValue::Text("red".to_string()),
                SqlValue::Text("Bob".to_string()),
                SqlValue::Integer(10),
            ]
        );
    }

    #[test]
    fn test_null_comparisons() {
        let db = database();
        let mut query = db.query("players");
        query.where_eq("guild", Value::Null).where_not("name", Value::Null);
        let statement = compile_query(query.spec()).unwrap();
        assert_eq!(
            statement.sql(),
            "SELECT * FROM \"players\" WHERE \"guild\" IS NULL AND \"name\" IS NOT NULL"
        );
        assert!(statement.params().is_empty());
    }

    #[test]
    fn test_compile_update_binds_assignments_before_filters() {
        let db = database();
        let mut update = db.update("players");
        update.where_eq("id", 7).set("coins", 5).set("active", true);

        let statement = compile_update(update.spec()).unwrap().unwrap();
        assert_eq!(
            statement.sql(),
            "UPDATE \"players\" SET \"coins\" = ?, \"active\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(
            statement.params(),
            &[SqlValue::Integer(5), SqlValue::Integer(1), SqlValue::Integer(7)]
        );
    }

    #[test]
    fn test_compile_update_without_assignments_is_noop() {
        let db = database();
        let mut update = db.update("players");
        update.where_eq("id", 7);
        assert!(compile_update(update.spec()).unwrap().is_none());
    }

    #[test]
    fn test_compile_insert() {
        let db = database();
        let insert = db.insert_document("players", &doc! { name: "Alice", stats: { hp: 3 } });
        let statement = compile_insert(insert.spec()).unwrap();
        assert_eq!(
            statement.sql(),
            "INSERT INTO \"players\" (\"name\", \"stats\") VALUES (?, ?)"
        );
        assert_eq!(
            statement.params(),
            &[
                SqlValue::Text("Alice".to_string()),
                SqlValue::Text("{\"hp\":3}".to_string()),
            ]
        );
    }

    #[test]
    fn test_compile_empty_insert() {
        let db = database();
        let statement = compile_insert(db.insert("log").spec()).unwrap();
        assert_eq!(statement.sql(), "INSERT INTO \"log\" DEFAULT VALUES");
    }

    #[test]
    fn test_compile_delete() {
        let db = database();
        let mut delete = db.delete("players");
        delete.filter(field("coins").lt(0));
        let statement = compile_delete(delete.spec()).unwrap();
        assert_eq!(statement.sql(), "DELETE FROM \"players\" WHERE \"coins\" < ?");
        assert_eq!(statement.params(), &[SqlValue::Integer(0)]);
    }

    #[test]
    fn test_list_values_are_rejected() {
        let db = database();
        let mut insert = db.insert("players");
        insert.set("tags", vec!["a", "b"]);
        let err = compile_insert(insert.spec()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_value_binding() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(to_sql_value(&Value::Uuid(id)).unwrap(), SqlValue::Text(id.to_string()));
        assert_eq!(to_sql_value(&Value::Char('x')).unwrap(), SqlValue::Text("x".to_string()));
        assert_eq!(to_sql_value(&Value::F32(0.1)).unwrap(), SqlValue::Real(0.1));
        assert_eq!(
            to_sql_value(&Value::Bytes(vec![1, 2])).unwrap(),
            SqlValue::Blob(vec![1, 2])
        );
    }

    #[test]
    fn test_compile_create_table() {
        let sql = compile_create_table(
            "players",
            &[
                SqlColumn::new("uuid", SqlColumnType::Varchar).with_param("36"),
                SqlColumn::new("coins", SqlColumnType::BigInt),
            ],
        )
        .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"players\" (\"uuid\" VARCHAR(36), \"coins\" BIGINT)"
        );
        assert_eq!(
            compile_create_table("empty", &[]).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
        let injected = compile_create_table(
            "players",
            &[SqlColumn::new("uuid", SqlColumnType::Varchar).with_param("36), evil TEXT")],
        );
        assert_eq!(injected.unwrap_err().kind(), &ErrorKind::InvalidOperation);
    }
}
