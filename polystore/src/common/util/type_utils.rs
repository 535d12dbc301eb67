use std::sync::Arc;

use parking_lot::RwLock;

/// Shared, lock-protected cell used for state that lives behind a cloneable handle.
pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_with_sees_written_value() {
        let cell = atomic(Some("sqlite".to_string()));
        cell.write_with(|v| *v = None);
        assert!(cell.read_with(|v| v.is_none()));
    }

    #[test]
    fn test_clones_share_state() {
        let cell = atomic(0_u32);
        let other = cell.clone();
        other.write_with(|v| *v += 2);
        assert_eq!(cell.read_with(|v| *v), 2);
    }
}
