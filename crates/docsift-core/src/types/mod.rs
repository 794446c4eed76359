//! Core types for docsift.

mod artifact;
mod format;

pub use artifact::*;
pub use format::*;
