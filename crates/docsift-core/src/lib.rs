//! docsift-core - Core library for docsift.
//!
//! This crate provides the artifact types, error taxonomy, component traits
//! and configuration shared by the docsift loaders, extractors and storage
//! backends.
//!
//! # Example
//!
//! ```ignore
//! use docsift_core::{ContentExtractor, Storage};
//!
//! let mut extractor = ExtractorFactory::pdf();
//! extractor.load(Path::new("report.pdf"))?;
//!
//! let text = extractor.extract_text()?;
//! if !text.is_empty() {
//!     storage.store(&Artifact::Text(text), "report.pdf")?;
//! }
//! storage.close()?;
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{ExtractionConfig, SiftConfig, StorageBackend, StorageConfig};
pub use error::{ErrorCode, InvalidReason, SiftError, SiftResult};
pub use traits::{ContentExtractor, DocumentLoader, DocumentSource, Storage};
pub use types::{Artifact, ArtifactKind, DocumentFormat, ExtractedImage, Table};
