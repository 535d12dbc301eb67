//! Common types shared by the document model, the builders and the adapters.

mod lock;
mod sort_order;
pub mod util;
mod value;

pub use lock::*;
pub use sort_order::*;
pub use util::*;
pub use value::*;
