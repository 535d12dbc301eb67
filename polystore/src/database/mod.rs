//! The backend-agnostic operation model.
//!
//! A [Database] handle wraps one [DatabaseProvider] and hands out builders
//! for select, update, insert, delete and upsert operations. Builders only
//! collect filters and values; `execute()` is the single call that reaches
//! the backend.
#[macro_use]
mod macros;

mod database;
mod deletion;
mod executed_query;
mod insertion;
mod insertion_or_update;
mod operation;
mod provider;
mod query;
mod schema;
mod update;

#[cfg(test)]
pub(crate) mod test_provider;

pub use database::*;
pub use deletion::*;
pub use executed_query::*;
pub use insertion::*;
pub use insertion_or_update::*;
pub use operation::*;
pub use provider::*;
pub use query::*;
pub use schema::*;
pub use update::*;
