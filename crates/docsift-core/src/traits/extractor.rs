//! Loader and extractor traits.
//!
//! A [`DocumentLoader`] validates a file and hands back an owned document
//! handle implementing [`DocumentSource`]. A [`ContentExtractor`] wraps a
//! loader, keeps the handle it produced, and exposes the four extraction
//! operations behind one object-safe contract.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::SiftResult;
use crate::types::{Artifact, DocumentFormat, ExtractedImage, Table};

/// Format-specific view of a loaded document.
///
/// Every method re-reads from the handle and may be called any number of
/// times in any order. Absent content yields an empty vector; a malformed
/// element yields `SiftError::ExtractionFailure`.
pub trait DocumentSource {
    /// Format of the underlying document.
    fn format(&self) -> DocumentFormat;

    /// Text of each logical unit (page, paragraph, slide) in reading order.
    /// Units without text are omitted.
    fn text_units(&self) -> SiftResult<Vec<String>>;

    /// Embedded images in order of first appearance.
    fn images(&self) -> SiftResult<Vec<ExtractedImage>>;

    /// Explicit hyperlink targets (link annotations, hyperlink
    /// relationships). Bare URLs in the text are found by the extractor.
    fn link_targets(&self) -> SiftResult<Vec<String>>;

    /// Tables in document order.
    fn tables(&self) -> SiftResult<Vec<Table>>;
}

/// Validates a path and produces a document handle.
pub trait DocumentLoader {
    /// Handle type produced on success.
    type Document: DocumentSource;

    /// Format this loader accepts.
    fn format(&self) -> DocumentFormat;

    /// Load and validate a file.
    ///
    /// Any failure (missing file, wrong container, corruption, password
    /// protection) is `SiftError::InvalidFormat`; no partial handle is
    /// ever returned.
    fn load_file(&self, path: &Path) -> SiftResult<Self::Document>;
}

/// Core extractor contract - every format's extractor implements this.
pub trait ContentExtractor {
    /// Format this extractor handles.
    fn format(&self) -> DocumentFormat;

    /// Load a document through the wrapped loader and keep its handle.
    fn load(&mut self, path: &Path) -> SiftResult<()>;

    /// Whether a document handle is currently held.
    fn is_loaded(&self) -> bool;

    /// One string per logical unit, in reading order.
    fn extract_text(&self) -> SiftResult<Vec<String>>;

    /// Embedded images in order of first appearance.
    fn extract_images(&self) -> SiftResult<Vec<ExtractedImage>>;

    /// Link targets and bare URLs, deduplicated.
    fn extract_urls(&self) -> SiftResult<BTreeSet<String>>;

    /// Tables in document order.
    fn extract_tables(&self) -> SiftResult<Vec<Table>>;

    /// Run all four operations, returning the streams in the order
    /// text, image, url, table.
    fn extract_all(&self) -> SiftResult<Vec<Artifact>> {
        Ok(vec![
            Artifact::Text(self.extract_text()?),
            Artifact::Image(self.extract_images()?),
            Artifact::Url(self.extract_urls()?),
            Artifact::Table(self.extract_tables()?),
        ])
    }
}
