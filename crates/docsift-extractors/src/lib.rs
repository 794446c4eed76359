//! docsift-extractors - Loaders and extractors for PDF, DOCX and PPTX.
//!
//! Every format provides a [`DocumentLoader`](docsift_core::DocumentLoader)
//! that validates a file and returns a document handle. The generic
//! [`Extractor`] wraps a loader and exposes the four extraction operations
//! through [`ContentExtractor`](docsift_core::ContentExtractor).
//!
//! # Features
//!
//! - `pdf` (default) - PDF extraction via lopdf
//! - `docx` (default) - DOCX extraction via docx-rs and the OOXML package reader
//! - `pptx` (default) - PPTX extraction via the OOXML package reader
//!
//! # Example
//!
//! ```ignore
//! use docsift_extractors::{ExtractionPipeline, ExtractorFactory};
//!
//! // Single document, operation by operation
//! let mut pdf = ExtractorFactory::pdf();
//! pdf.load(Path::new("report.pdf"))?;
//! let pages = pdf.extract_text()?;
//!
//! // Extract and store everything
//! let mut pipeline = ExtractionPipeline::new(storage);
//! let report = pipeline.process("slides.pptx")?;
//! pipeline.close()?;
//! ```

mod base;
mod factory;
mod images;
mod pipeline;
mod signature;
mod source;
mod urls;

#[cfg(feature = "ooxml")]
mod error;

#[cfg(feature = "ooxml")]
mod ooxml;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

#[cfg(feature = "pptx")]
mod pptx;

pub use base::Extractor;
pub use factory::ExtractorFactory;
pub use pipeline::{ExtractionPipeline, ExtractionReport};
pub use signature::FileSignature;
pub use urls::{find_urls, is_absolute_url};

#[cfg(feature = "pdf")]
pub use pdf::{PdfDocument, PdfExtractor, PdfLoader};

#[cfg(feature = "docx")]
pub use docx::{DocxDocument, DocxExtractor, DocxLoader};

#[cfg(feature = "pptx")]
pub use pptx::{PptxDocument, PptxExtractor, PptxLoader};
