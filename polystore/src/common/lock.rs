use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A handle to one named lock obtained from a [LockRegistry].
#[derive(Clone)]
pub struct LockHandle {
    lock: Arc<Mutex<()>>,
}

impl LockHandle {
    /// Blocks until the lock is held by the caller.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }
}

/// Registry of named locks, one per table or collection.
///
/// Each [Database](crate::database::Database) handle owns a registry and uses
/// it to serialize the query-then-write sequence of `insert_or_update` on the
/// same table. The registry is local to the process and to the handle, so it
/// does not protect against other processes writing to the same backend.
///
/// # Examples
///
/// ```
/// use polystore::common::LockRegistry;
///
/// let registry = LockRegistry::new();
/// let handle = registry.get_lock("players");
/// {
///     let _guard = handle.lock();
/// } // released here
/// assert_eq!(registry.lock_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LockRegistry {
    /// Creates a new empty lock registry.
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Gets the lock for the given name, creating it on first use.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        LockHandle { lock }
    }

    /// Removes a lock from the registry. Returns `true` if it existed.
    pub fn remove_lock(&self, name: &str) -> bool {
        self.locks.lock().remove(name).is_some()
    }

    /// Returns the number of locks currently registered.
    pub fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }
}
