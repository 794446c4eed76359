//! Filesystem storage backend.

use std::fs;
use std::path::{Path, PathBuf};

use docsift_core::{Artifact, ArtifactKind, ExtractedImage, SiftError, SiftResult, Storage};

use crate::serialize::{render_tables, render_text, render_urls};

/// Writes each artifact stream to a kind-specific location under an
/// output directory.
///
/// Text, URL and table streams become `<source>_<kind>.txt`; images land in
/// a `<source>_images/` directory as `image_<n>.<ext>`. Storing the same
/// `(source, kind)` again replaces the previous content.
#[derive(Debug)]
pub struct FileStorage {
    output_dir: PathBuf,
    closed: bool,
}

impl FileStorage {
    /// Create the backend, creating `output_dir` if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> SiftResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| {
            SiftError::storage_unavailable_with(
                format!("cannot create output directory {}", output_dir.display()),
                e,
            )
        })?;
        if !output_dir.is_dir() {
            return Err(SiftError::storage_unavailable(format!(
                "{} is not a directory",
                output_dir.display()
            )));
        }

        tracing::info!("Opened file storage at {}", output_dir.display());
        Ok(Self {
            output_dir,
            closed: false,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location an artifact of `kind` for `source_name` is written to.
    ///
    /// Only the final path component of `source_name` is used, so a full
    /// document path and its file name map to the same location.
    pub fn path_for(&self, source_name: &str, kind: ArtifactKind) -> PathBuf {
        let stem = base_name(source_name);
        match kind {
            ArtifactKind::Image => self.output_dir.join(format!("{}_images", stem)),
            _ => self.output_dir.join(format!("{}_{}.txt", stem, kind)),
        }
    }

    fn write_images(&self, dir: &Path, images: &[ExtractedImage]) -> SiftResult<()> {
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| write_error(dir, e))?;
        }
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

        for (i, image) in images.iter().enumerate() {
            let path = dir.join(format!("image_{}.{}", i + 1, image.extension()));
            fs::write(&path, &image.data).map_err(|e| write_error(&path, e))?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn store(&mut self, data: &Artifact, source_name: &str) -> SiftResult<()> {
        if self.closed {
            return Err(SiftError::storage_unavailable("file storage is closed"));
        }

        let path = self.path_for(source_name, data.kind());
        match data {
            Artifact::Image(images) => self.write_images(&path, images)?,
            Artifact::Text(units) => write_file(&path, &render_text(units))?,
            Artifact::Url(urls) => write_file(&path, &render_urls(urls))?,
            Artifact::Table(tables) => write_file(&path, &render_tables(tables))?,
        }

        tracing::debug!(
            "Stored {} {} element(s) for {} at {}",
            data.len(),
            data.kind(),
            source_name,
            path.display()
        );
        Ok(())
    }

    fn close(&mut self) -> SiftResult<()> {
        if !self.closed {
            self.closed = true;
            tracing::info!("Closed file storage at {}", self.output_dir.display());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

fn base_name(source_name: &str) -> &str {
    Path::new(source_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("document")
}

fn write_file(path: &Path, content: &str) -> SiftResult<()> {
    fs::write(path, content).map_err(|e| write_error(path, e))
}

fn write_error(path: &Path, err: std::io::Error) -> SiftError {
    SiftError::Storage {
        message: format!("failed to write {}: {}", path.display(), err),
        source: Some(Box::new(err)),
    }
}
