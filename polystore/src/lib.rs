//! # Polystore - Backend-Agnostic Data Access
//!
//! Polystore lets application code select, update, insert, upsert and delete
//! records through one fluent API, whether the records live in a relational
//! database or in a schemaless document store. Results come back as
//! [Document]s, an ordered hierarchical key-value model that is also used
//! for configuration.
//!
//! ## Key Features
//!
//! - **One API, many backends**: builders compile to SQL in
//!   `polystore-sql-adapter` and to operator documents in
//!   `polystore-docstore-adapter`
//! - **Forgiving reads**: typed document getters never fail and fall back to
//!   a zero value or a caller supplied default
//! - **Upsert**: `insert_or_update` queries first and then updates or inserts
//! - **Read-through caching**: [CachedDatabaseAccess] keeps keyed values in a
//!   concurrent map in front of any [DatabaseAccess]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use polystore::{Database, DatabaseConfig};
//! use polystore_sql_adapter::SqliteDatabase;
//!
//! let db = Database::new(SqliteDatabase::new(), DatabaseConfig::default());
//! db.connect()?;
//!
//! db.insert_or_update("players")
//!     .where_eq("uuid", "b7a1")
//!     .set("coins", 10)
//!     .execute()?;
//!
//! let rich = db.query("players")
//!     .filter(polystore::filter::field("coins").gt(5))
//!     .execute()?;
//! rich.print();
//!
//! db.disconnect()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`access`] - Keyed accessors and the caching decorator
//! - [`common`] - Values, sort order, locks and small utilities
//! - [`database`] - The database handle, builders and the provider trait
//! - [`database_config`] - Connection and accessor configuration
//! - [`document`] - The document model and the `doc!` macro
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Filter predicates and the fluent `field()` API

pub mod access;
pub mod common;
pub mod database;
pub mod database_config;
pub mod document;
pub mod errors;
pub mod filter;

pub use access::{CachedDatabaseAccess, DatabaseAccess, DirectDatabaseAccess};
pub use common::{SortOrder, Value};
pub use database::{Database, DatabaseProvider, ExecutedQuery};
pub use database_config::{DatabaseAccessConfig, DatabaseConfig};
pub use document::{Document, PropertiesDocument};
pub use errors::{ErrorKind, PolyError, PolyResult};
