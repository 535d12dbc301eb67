//! Relational backend for polystore.
//!
//! [SqliteDatabase] implements [polystore::DatabaseProvider] over an
//! embedded SQLite connection. Builders compile to parameterized statements
//! in [compiler]; result rows come back as read-only documents keyed by
//! column name.

pub mod compiler;
mod sqlite_database;

pub use sqlite_database::*;

#[cfg(test)]
mod tests {
    #[ctor::ctor]
    fn init() {
        colog::init();
    }
}
