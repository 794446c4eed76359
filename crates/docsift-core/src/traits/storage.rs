//! Storage trait.

use crate::error::SiftResult;
use crate::types::Artifact;

/// Core Storage trait - all persistence backends implement this.
///
/// Backends never interpret artifact content; records are keyed by
/// `(source_name, data.kind())`.
pub trait Storage: Send {
    /// Persist one artifact stream for a source document.
    fn store(&mut self, data: &Artifact, source_name: &str) -> SiftResult<()>;

    /// Release backend resources. Idempotent; safe when nothing was stored.
    fn close(&mut self) -> SiftResult<()>;

    /// Human-readable backend name.
    fn name(&self) -> &str;
}
