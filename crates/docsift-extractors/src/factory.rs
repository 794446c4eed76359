//! Factory for creating extractors.

use std::path::Path;

use docsift_core::{ContentExtractor, DocumentFormat, ExtractionConfig, SiftError, SiftResult};

#[cfg(feature = "pdf")]
use crate::pdf::{PdfExtractor, PdfLoader};

#[cfg(feature = "docx")]
use crate::docx::{DocxExtractor, DocxLoader};

#[cfg(feature = "pptx")]
use crate::pptx::{PptxExtractor, PptxLoader};

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Box<dyn ContentExtractor> {
        Self::pdf_with_config(ExtractionConfig::default())
    }

    /// Create a PDF extractor with custom extraction settings.
    #[cfg(feature = "pdf")]
    pub fn pdf_with_config(config: ExtractionConfig) -> Box<dyn ContentExtractor> {
        Box::new(PdfExtractor::with_config(
            PdfLoader::with_config(config.clone()),
            config,
        ))
    }

    /// Create a DOCX extractor.
    #[cfg(feature = "docx")]
    pub fn docx() -> Box<dyn ContentExtractor> {
        Self::docx_with_config(ExtractionConfig::default())
    }

    /// Create a DOCX extractor with custom extraction settings.
    #[cfg(feature = "docx")]
    pub fn docx_with_config(config: ExtractionConfig) -> Box<dyn ContentExtractor> {
        Box::new(DocxExtractor::with_config(DocxLoader::new(), config))
    }

    /// Create a PPTX extractor.
    #[cfg(feature = "pptx")]
    pub fn pptx() -> Box<dyn ContentExtractor> {
        Self::pptx_with_config(ExtractionConfig::default())
    }

    /// Create a PPTX extractor with custom extraction settings.
    #[cfg(feature = "pptx")]
    pub fn pptx_with_config(config: ExtractionConfig) -> Box<dyn ContentExtractor> {
        Box::new(PptxExtractor::with_config(PptxLoader::new(), config))
    }

    /// Create the extractor for a document format.
    #[allow(unused_variables)]
    pub fn for_format(
        format: DocumentFormat,
        config: &ExtractionConfig,
    ) -> SiftResult<Box<dyn ContentExtractor>> {
        match format {
            #[cfg(feature = "pdf")]
            DocumentFormat::Pdf => Ok(Self::pdf_with_config(config.clone())),

            #[cfg(feature = "docx")]
            DocumentFormat::Docx => Ok(Self::docx_with_config(config.clone())),

            #[cfg(feature = "pptx")]
            DocumentFormat::Pptx => Ok(Self::pptx_with_config(config.clone())),

            #[allow(unreachable_patterns)]
            other => Err(SiftError::Configuration(format!(
                "{} support is not enabled",
                other.label()
            ))),
        }
    }

    /// Create the extractor matching a file's extension.
    pub fn for_path(
        path: impl AsRef<Path>,
        config: &ExtractionConfig,
    ) -> SiftResult<Box<dyn ContentExtractor>> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path).ok_or_else(|| {
            SiftError::Configuration(format!("Unsupported document type: {}", path.display()))
        })?;
        Self::for_format(format, config)
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Box<dyn ContentExtractor>> {
        let mut extractors: Vec<Box<dyn ContentExtractor>> = Vec::new();

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "docx")]
        extractors.push(Self::docx());

        #[cfg(feature = "pptx")]
        extractors.push(Self::pptx());

        extractors
    }
}
