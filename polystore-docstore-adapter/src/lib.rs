//! Document-store backend for polystore.
//!
//! [DocumentStoreDatabase] implements [polystore::DatabaseProvider] on top
//! of a [DocumentStoreClient]. Filters and assignments compile to operator
//! documents in [compiler]; [InMemoryDocumentStore] evaluates them in
//! process.

pub mod compiler;
mod client;
mod database;
mod memory;

pub use client::*;
pub use database::*;
pub use memory::*;
