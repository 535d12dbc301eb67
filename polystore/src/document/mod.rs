mod document;
mod properties;

pub use document::*;
pub use properties::*;
