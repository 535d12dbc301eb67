use crate::access::{DatabaseAccess, DirectDatabaseAccess};
use crate::database::Database;
use crate::database_config::DatabaseAccessConfig;
use crate::errors::PolyResult;
use dashmap::DashMap;

/// A read-through cache in front of any [DatabaseAccess].
///
/// A lookup that misses the cache reads from the wrapped accessor and keeps
/// the result. A write updates the cache first and then the backend, so a
/// reader on this instance sees its own writes without another backend
/// read. Entries live as long as the decorator: nothing expires and the
/// size is not bounded. Writes made by other processes or other instances
/// are not observed once a key is cached.
///
/// Absent values are not cached, so a key that does not exist yet is read
/// from the backend again on the next lookup.
///
/// ```text
/// let coins = CachedDatabaseAccess::i32_access(db.clone(), DatabaseAccessConfig::new("coins", "uuid", "amount"));
/// coins.set_value("u-1", 10)?;
/// assert_eq!(coins.get_value("u-1")?, Some(10)); // served from the cache
/// ```
pub struct CachedDatabaseAccess<V, A> {
    inner: A,
    cache: DashMap<String, V>,
}

impl<V, A> CachedDatabaseAccess<V, A>
where
    V: Clone + Send + Sync,
    A: DatabaseAccess<V>,
{
    pub fn new(inner: A) -> Self {
        CachedDatabaseAccess {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Number of keys currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, key: &str) -> Option<V> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    /// Caches a value read from the backend unless a write got there
    /// first, and returns whichever value the cache holds.
    fn remember_read(&self, key: &str, value: V) -> V {
        self.cache
            .entry(key.to_string())
            .or_insert(value)
            .value()
            .clone()
    }
}

impl CachedDatabaseAccess<String, DirectDatabaseAccess<String>> {
    pub fn string_access(database: Database, config: DatabaseAccessConfig) -> Self {
        CachedDatabaseAccess::new(DirectDatabaseAccess::string_access(database, config))
    }
}

impl CachedDatabaseAccess<i32, DirectDatabaseAccess<i32>> {
    pub fn i32_access(database: Database, config: DatabaseAccessConfig) -> Self {
        CachedDatabaseAccess::new(DirectDatabaseAccess::i32_access(database, config))
    }
}

impl CachedDatabaseAccess<i64, DirectDatabaseAccess<i64>> {
    pub fn i64_access(database: Database, config: DatabaseAccessConfig) -> Self {
        CachedDatabaseAccess::new(DirectDatabaseAccess::i64_access(database, config))
    }
}

impl CachedDatabaseAccess<f64, DirectDatabaseAccess<f64>> {
    pub fn f64_access(database: Database, config: DatabaseAccessConfig) -> Self {
        CachedDatabaseAccess::new(DirectDatabaseAccess::f64_access(database, config))
    }
}

impl<V, A> DatabaseAccess<V> for CachedDatabaseAccess<V, A>
where
    V: Clone + Send + Sync,
    A: DatabaseAccess<V>,
{
    fn get_value(&self, key: &str) -> PolyResult<Option<V>> {
        if let Some(value) = self.cached(key) {
            return Ok(Some(value));
        }

        let value = self.inner.get_value(key)?;
        Ok(value.map(|value| self.remember_read(key, value)))
    }

    /// The default itself is cached when the backend has no value, so later
    /// lookups return it without a backend read.
    fn get_value_or(&self, key: &str, default: V) -> PolyResult<V> {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }

        let value = self.inner.get_value_or(key, default)?;
        Ok(self.remember_read(key, value))
    }

    fn get_value_optional(&self, key: &str) -> PolyResult<Option<V>> {
        if let Some(value) = self.cached(key) {
            return Ok(Some(value));
        }

        let value = self.inner.get_value_optional(key)?;
        Ok(value.map(|value| self.remember_read(key, value)))
    }

    fn set_value(&self, key: &str, value: V) -> PolyResult<()> {
        self.cache.insert(key.to_string(), value.clone());
        self.inner.set_value(key, value)
    }
}
