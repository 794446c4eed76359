//! Generic extractor shared by every format.

use std::collections::BTreeSet;
use std::path::Path;

use docsift_core::{
    ContentExtractor, DocumentFormat, DocumentLoader, DocumentSource, ExtractedImage,
    ExtractionConfig, SiftError, SiftResult, Table,
};

use crate::urls::{find_urls, is_absolute_url};

/// Extractor over any [`DocumentLoader`].
///
/// Holds the handle produced by the last successful [`load`]; a failed load
/// leaves any previously held document untouched.
///
/// [`load`]: ContentExtractor::load
pub struct Extractor<L: DocumentLoader> {
    loader: L,
    document: Option<L::Document>,
    config: ExtractionConfig,
}

impl<L: DocumentLoader> Extractor<L> {
    /// Create an extractor around `loader` with default extraction settings.
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, ExtractionConfig::default())
    }

    /// Create an extractor with custom extraction settings.
    pub fn with_config(loader: L, config: ExtractionConfig) -> Self {
        Self {
            loader,
            document: None,
            config,
        }
    }

    /// The wrapped loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Extraction settings in effect.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The held document handle, if any.
    pub fn document(&self) -> Option<&L::Document> {
        self.document.as_ref()
    }

    fn loaded(&self) -> SiftResult<&L::Document> {
        self.document.as_ref().ok_or(SiftError::NotLoaded {
            format: self.loader.format(),
        })
    }
}

impl<L: DocumentLoader> ContentExtractor for Extractor<L> {
    fn format(&self) -> DocumentFormat {
        self.loader.format()
    }

    fn load(&mut self, path: &Path) -> SiftResult<()> {
        let document = self.loader.load_file(path)?;
        tracing::debug!("Loaded {} document {}", self.format().label(), path.display());
        self.document = Some(document);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    fn extract_text(&self) -> SiftResult<Vec<String>> {
        let text = self.loaded()?.text_units()?;
        tracing::debug!("Extracted {} text units", text.len());
        Ok(text)
    }

    fn extract_images(&self) -> SiftResult<Vec<ExtractedImage>> {
        let images = self.loaded()?.images()?;
        tracing::debug!("Extracted {} images", images.len());
        Ok(images)
    }

    fn extract_urls(&self) -> SiftResult<BTreeSet<String>> {
        let document = self.loaded()?;

        let mut urls: BTreeSet<String> = document
            .link_targets()?
            .into_iter()
            .filter(|target| is_absolute_url(target))
            .collect();

        if self.config.detect_bare_urls {
            for unit in document.text_units()? {
                urls.extend(find_urls(&unit));
            }
        }

        tracing::debug!("Extracted {} unique URLs", urls.len());
        Ok(urls)
    }

    fn extract_tables(&self) -> SiftResult<Vec<Table>> {
        let tables = self.loaded()?.tables()?;
        tracing::debug!("Extracted {} tables", tables.len());
        Ok(tables)
    }
}
