//! Keyed single-value access on top of a [Database](crate::database::Database).
//!
//! [DirectDatabaseAccess] reads and writes one value per key straight
//! through the backend. [CachedDatabaseAccess] decorates any accessor with
//! a read-through cache that never expires.
mod cached;
mod database_access;
mod direct;

pub use cached::*;
pub use database_access::*;
pub use direct::*;
