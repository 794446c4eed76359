//! Reading source files for the loaders.

use std::fmt::Display;
use std::path::Path;

use docsift_core::{DocumentFormat, InvalidReason, SiftError, SiftResult};

use crate::signature::FileSignature;

/// Bytes of a source file plus its sniffed signature.
pub(crate) struct SourceFile {
    pub bytes: Vec<u8>,
    pub signature: FileSignature,
}

/// Read a file for `format`, rejecting missing, unreadable and zero-length
/// files.
pub(crate) fn read_source(path: &Path, format: DocumentFormat) -> SiftResult<SourceFile> {
    let bytes = std::fs::read(path)
        .map_err(|e| reject(format, InvalidReason::Unreadable, path, e))?;

    let signature = FileSignature::detect(&bytes);
    if signature == FileSignature::Empty {
        return Err(reject(format, InvalidReason::EmptyFile, path, "zero-length file"));
    }

    Ok(SourceFile { bytes, signature })
}

/// Log a rejection with its internal reason and build the uniform error.
pub(crate) fn reject(
    format: DocumentFormat,
    reason: InvalidReason,
    path: &Path,
    detail: impl Display,
) -> SiftError {
    tracing::debug!(
        "Rejected {} file {} ({}): {}",
        format.label(),
        path.display(),
        reason.as_str(),
        detail
    );
    SiftError::invalid_format(format, reason)
}
