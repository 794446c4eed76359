//! Core traits for docsift components.

mod extractor;
mod storage;

pub use extractor::*;
pub use storage::*;
