//! Extraction pipeline: load a document, run every extraction and persist
//! the non-empty results.

use std::collections::BTreeSet;
use std::path::Path;

use docsift_core::{
    Artifact, ArtifactKind, DocumentFormat, ExtractedImage, ExtractionConfig, SiftResult,
    Storage, Table,
};

use crate::ExtractorFactory;

/// Everything extracted from one document, plus which kinds were stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Base name the artifacts were stored under.
    pub source_name: String,
    pub format: Option<DocumentFormat>,
    pub text: Vec<String>,
    pub images: Vec<ExtractedImage>,
    pub urls: BTreeSet<String>,
    pub tables: Vec<Table>,
    /// Kinds handed to storage, in the order they were stored.
    pub stored: Vec<ArtifactKind>,
}

impl ExtractionReport {
    /// Whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty() && self.urls.is_empty() && self.tables.is_empty()
    }
}

/// Pipeline routing documents to the extractor for their extension and
/// writing results to one storage backend.
pub struct ExtractionPipeline {
    storage: Box<dyn Storage>,
    config: ExtractionConfig,
}

impl ExtractionPipeline {
    /// Create a pipeline over a storage backend with default settings.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_config(storage, ExtractionConfig::default())
    }

    /// Create a pipeline with custom extraction settings.
    pub fn with_config(storage: Box<dyn Storage>, config: ExtractionConfig) -> Self {
        Self { storage, config }
    }

    /// The storage backend.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Extract everything from `path` and store each non-empty stream under
    /// the file's base name.
    pub fn process(&mut self, path: impl AsRef<Path>) -> SiftResult<ExtractionReport> {
        let path = path.as_ref();
        let mut extractor = ExtractorFactory::for_path(path, &self.config)?;
        extractor.load(path)?;

        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut report = ExtractionReport {
            source_name: source_name.clone(),
            format: Some(extractor.format()),
            ..Default::default()
        };

        for artifact in extractor.extract_all()? {
            if artifact.is_empty() {
                tracing::debug!("No {} found in {}; skipping", artifact.kind(), source_name);
            } else {
                self.storage.store(&artifact, &source_name)?;
                report.stored.push(artifact.kind());
            }

            match artifact {
                Artifact::Text(text) => report.text = text,
                Artifact::Image(images) => report.images = images,
                Artifact::Url(urls) => report.urls = urls,
                Artifact::Table(tables) => report.tables = tables,
            }
        }

        tracing::info!(
            "Processed {}: stored {} of 4 artifact kinds in {}",
            source_name,
            report.stored.len(),
            self.storage.name()
        );

        Ok(report)
    }

    /// Close the storage backend.
    pub fn close(&mut self) -> SiftResult<()> {
        self.storage.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::SiftError;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingStorage {
        stored: Arc<Mutex<Vec<(String, ArtifactKind)>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl Storage for RecordingStorage {
        fn store(&mut self, data: &Artifact, source_name: &str) -> SiftResult<()> {
            self.stored
                .lock()
                .unwrap()
                .push((source_name.to_string(), data.kind()));
            Ok(())
        }

        fn close(&mut self) -> SiftResult<()> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let mut pipeline = ExtractionPipeline::new(Box::new(RecordingStorage::default()));
        let result = pipeline.process("notes.txt");
        assert!(matches!(result, Err(SiftError::Configuration(_))));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_invalid_file_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let storage = RecordingStorage::default();
        let mut pipeline = ExtractionPipeline::new(Box::new(storage.clone()));
        let err = pipeline.process(&path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid PDF file.");
        assert!(storage.stored.lock().unwrap().is_empty());
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_process_stores_non_empty_kinds() {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text("Details at https://example.com/memo")),
            )
            .build()
            .pack(file)
            .unwrap();

        let storage = RecordingStorage::default();
        let mut pipeline = ExtractionPipeline::new(Box::new(storage.clone()));
        let report = pipeline.process(&path).unwrap();

        assert_eq!(report.source_name, "memo.docx");
        assert_eq!(report.format, Some(DocumentFormat::Docx));
        assert_eq!(report.stored, vec![ArtifactKind::Text, ArtifactKind::Url]);
        assert!(report.urls.contains("https://example.com/memo"));
        assert!(report.images.is_empty());

        let stored = storage.stored.lock().unwrap().clone();
        assert_eq!(
            stored,
            vec![
                ("memo.docx".to_string(), ArtifactKind::Text),
                ("memo.docx".to_string(), ArtifactKind::Url),
            ]
        );

        pipeline.close().unwrap();
        assert!(*storage.closed.lock().unwrap());
    }
}
