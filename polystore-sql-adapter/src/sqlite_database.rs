use crate::compiler::{
    compile_create_table, compile_delete, compile_insert, compile_query, compile_update,
    SqlStatement, FOLD_CASE_FUNCTION,
};
use parking_lot::Mutex;
use polystore::common::Value;
use polystore::database::{
    DatabaseProvider, DeleteSpec, ExecutedQuery, InsertSpec, QuerySpec, SqlColumn, UpdateSpec,
};
use polystore::errors::{ErrorKind, PolyError, PolyResult};
use polystore::{DatabaseConfig, Document};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};

/// A relational backend over SQLite.
///
/// The connection opens the file named by [DatabaseConfig::file], or an
/// in-memory database when no file is configured. All statements run on
/// one connection guarded by a mutex.
///
/// ```rust
/// use polystore::{Database, DatabaseConfig};
/// use polystore_sql_adapter::SqliteDatabase;
///
/// let db = Database::new(SqliteDatabase::new(), DatabaseConfig::default());
/// db.connect().unwrap();
/// assert!(db.list_tables().unwrap().is_empty());
/// db.disconnect().unwrap();
/// ```
#[derive(Default)]
pub struct SqliteDatabase {
    connection: Mutex<Option<Connection>>,
}

pub(crate) fn to_poly_error(message: &str, error: rusqlite::Error) -> PolyError {
    log::error!("{}: {}", message, error);
    PolyError::backend(message, error)
}

fn register_functions(connection: &Connection) -> rusqlite::Result<()> {
    connection.create_scalar_function(
        FOLD_CASE_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let folded = match ctx.get_raw(0) {
                ValueRef::Text(text) => SqlValue::Text(String::from_utf8_lossy(text).to_lowercase()),
                other => SqlValue::from(other),
            };
            Ok(folded)
        },
    )
}

fn read_value(row: &Row, index: usize) -> rusqlite::Result<Value> {
    let value = match row.get_ref(index)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::I64(i),
        ValueRef::Real(f) => Value::F64(f),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    };
    Ok(value)
}

fn read_row(row: &Row, columns: &[String]) -> rusqlite::Result<Document> {
    let mut entries = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        entries.push((column.clone(), read_value(row, index)?));
    }
    Ok(entries.into_iter().collect())
}

impl SqliteDatabase {
    pub fn new() -> Self {
        SqliteDatabase {
            connection: Mutex::new(None),
        }
    }

    fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> PolyResult<R>) -> PolyResult<R> {
        let guard = self.connection.lock();
        match guard.as_ref() {
            Some(connection) => f(connection),
            None => {
                log::error!("SQLite connection is not open");
                Err(PolyError::new(
                    "SQLite connection is not open",
                    ErrorKind::ConnectionState,
                ))
            }
        }
    }

    fn run(&self, statement: &SqlStatement) -> PolyResult<usize> {
        log::debug!("Executing {}", statement.sql());
        self.with_connection(|connection| {
            connection
                .execute(statement.sql(), params_from_iter(statement.params().iter()))
                .map_err(|err| to_poly_error("Failed to execute statement", err))
        })
    }
}

impl DatabaseProvider for SqliteDatabase {
    fn connect(&self, config: &DatabaseConfig) -> PolyResult<()> {
        let connection = match config.file() {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }
        .map_err(|err| to_poly_error("Failed to open SQLite database", err))?;
        register_functions(&connection)
            .map_err(|err| to_poly_error("Failed to register SQL functions", err))?;

        log::debug!(
            "Opened SQLite database {}",
            config.file().unwrap_or(":memory:")
        );
        *self.connection.lock() = Some(connection);
        Ok(())
    }

    fn disconnect(&self) -> PolyResult<()> {
        let connection = self.connection.lock().take();
        if let Some(connection) = connection {
            connection
                .close()
                .map_err(|(_, err)| to_poly_error("Failed to close SQLite database", err))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn create_table_if_not_exists(&self, name: &str, columns: &[SqlColumn]) -> PolyResult<()> {
        let sql = compile_create_table(name, columns)?;
        log::debug!("Executing {}", sql);
        self.with_connection(|connection| {
            connection
                .execute(&sql, [])
                .map(|_| ())
                .map_err(|err| to_poly_error("Failed to create table", err))
        })
    }

    fn list_tables(&self) -> PolyResult<Vec<String>> {
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )
                .map_err(|err| to_poly_error("Failed to list tables", err))?;
            let names = statement
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|err| to_poly_error("Failed to list tables", err))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|err| to_poly_error("Failed to list tables", err))?;
            Ok(names)
        })
    }

    fn execute_query(&self, query: &QuerySpec) -> PolyResult<ExecutedQuery> {
        let compiled = compile_query(query)?;
        log::debug!("Executing {}", compiled.sql());
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(compiled.sql())
                .map_err(|err| to_poly_error("Failed to prepare query", err))?;
            let columns: Vec<String> = statement
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();

            let rows = statement
                .query_map(params_from_iter(compiled.params().iter()), |row| {
                    read_row(row, &columns)
                })
                .map_err(|err| to_poly_error("Failed to execute query", err))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|err| to_poly_error("Failed to read query result", err))?;
            Ok(ExecutedQuery::new(rows))
        })
    }

    fn execute_update(&self, update: &UpdateSpec) -> PolyResult<()> {
        match compile_update(update)? {
            Some(statement) => self.run(&statement).map(|_| ()),
            None => {
                log::debug!("Update on '{}' assigns nothing, skipping", update.table());
                Ok(())
            }
        }
    }

    fn execute_insert(&self, insert: &InsertSpec) -> PolyResult<()> {
        let statement = compile_insert(insert)?;
        self.run(&statement).map(|_| ())
    }

    fn execute_delete(&self, delete: &DeleteSpec) -> PolyResult<()> {
        let statement = compile_delete(delete)?;
        self.run(&statement).map(|_| ())
    }
}
