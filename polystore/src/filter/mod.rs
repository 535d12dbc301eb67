//! Filter predicates shared by every backend.
//!
//! A filter names one field and a condition on it. Builders keep at most one
//! filter per field, and every backend compiles the same model into its own
//! native form.
//!
//! # Creating Filters
//!
//! - `field("name").eq("Alice")` - typed equality
//! - `field("name").eq_ignore_case("alice")` - case-insensitive string equality
//! - `field("age").gt(30)` - comparison operators (`ne`, `gt`, `gte`, `lt`, `lte`)
//!
//! # Examples
//!
//! ```rust
//! use polystore::doc;
//! use polystore::filter::field;
//!
//! let filter = field("name").eq_ignore_case("ALICE");
//! assert!(filter.matches(&doc! { name: "alice" }));
//! assert!(!field("age").gt(30).matches(&doc! { age: 30 }));
//! ```
mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
