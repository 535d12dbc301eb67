use crate::access::DatabaseAccess;
use crate::common::Value;
use crate::database::Database;
use crate::database_config::DatabaseAccessConfig;
use crate::document::Document;
use crate::errors::PolyResult;
use std::sync::Arc;

/// Extracts a typed value from a result row, given the value column name.
pub type ValueMapper<V> = Arc<dyn Fn(&Document, &str) -> Option<V> + Send + Sync>;

/// Reads and writes keyed values straight through the backend.
///
/// A lookup queries `table` for the row whose `key_field` equals the key
/// and maps its `value_field` through the mapper. A write is an upsert on
/// the same key.
///
/// ```text
/// let settings = DirectDatabaseAccess::string_access(
///     db.clone(),
///     DatabaseAccessConfig::new("settings", "key", "value"),
/// );
/// settings.set_value("motd", "welcome".to_string())?;
/// ```
pub struct DirectDatabaseAccess<V> {
    database: Database,
    config: DatabaseAccessConfig,
    mapper: ValueMapper<V>,
}

fn present(document: &Document, field: &str) -> bool {
    document.get(field).map(|v| !v.is_null()).unwrap_or(false)
}

impl<V> DirectDatabaseAccess<V> {
    pub fn new<F>(database: Database, config: DatabaseAccessConfig, mapper: F) -> Self
    where
        F: Fn(&Document, &str) -> Option<V> + Send + Sync + 'static,
    {
        DirectDatabaseAccess {
            database,
            config,
            mapper: Arc::new(mapper),
        }
    }

    pub fn config(&self) -> &DatabaseAccessConfig {
        &self.config
    }
}

impl DirectDatabaseAccess<String> {
    pub fn string_access(database: Database, config: DatabaseAccessConfig) -> Self {
        DirectDatabaseAccess::new(database, config, |doc, field| doc.get_string(field))
    }
}

impl DirectDatabaseAccess<i32> {
    pub fn i32_access(database: Database, config: DatabaseAccessConfig) -> Self {
        DirectDatabaseAccess::new(database, config, |doc, field| {
            present(doc, field).then(|| doc.get_i32(field))
        })
    }
}

impl DirectDatabaseAccess<i64> {
    pub fn i64_access(database: Database, config: DatabaseAccessConfig) -> Self {
        DirectDatabaseAccess::new(database, config, |doc, field| {
            present(doc, field).then(|| doc.get_i64(field))
        })
    }
}

impl DirectDatabaseAccess<f64> {
    pub fn f64_access(database: Database, config: DatabaseAccessConfig) -> Self {
        DirectDatabaseAccess::new(database, config, |doc, field| {
            present(doc, field).then(|| doc.get_f64(field))
        })
    }
}

impl<V> DatabaseAccess<V> for DirectDatabaseAccess<V>
where
    V: Into<Value> + Send + Sync,
{
    fn get_value(&self, key: &str) -> PolyResult<Option<V>> {
        let result = self
            .database
            .query(self.config.table())
            .where_eq(self.config.key_field(), key)
            .select(&[self.config.value_field()])
            .execute()?;

        Ok(result
            .first()
            .and_then(|doc| (self.mapper)(doc, self.config.value_field())))
    }

    fn set_value(&self, key: &str, value: V) -> PolyResult<()> {
        self.database
            .insert_or_update(self.config.table())
            .where_eq(self.config.key_field(), key)
            .set(self.config.value_field(), value)
            .execute()
    }
}
