use crate::errors::PolyResult;

/// Reads and writes a single value by key.
pub trait DatabaseAccess<V>: Send + Sync {
    /// Gets the value stored under `key`, or `None` when there is none.
    fn get_value(&self, key: &str) -> PolyResult<Option<V>>;

    /// Gets the value stored under `key`, falling back to `default`.
    fn get_value_or(&self, key: &str, default: V) -> PolyResult<V> {
        Ok(self.get_value(key)?.unwrap_or(default))
    }

    /// Optional lookup. Defaults to [DatabaseAccess::get_value].
    fn get_value_optional(&self, key: &str) -> PolyResult<Option<V>> {
        self.get_value(key)
    }

    /// Stores `value` under `key`, creating the entry if needed.
    fn set_value(&self, key: &str, value: V) -> PolyResult<()>;
}
