//! Internal parsing errors.
//!
//! These never cross the crate boundary: loaders map them to
//! `SiftError::InvalidFormat` and extraction operations to
//! `SiftError::ExtractionFailure`.

use thiserror::Error;

/// Errors raised while reading an Office Open XML package.
#[derive(Error, Debug)]
pub(crate) enum PackageError {
    /// The container is not a readable ZIP archive.
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error while inflating a part.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part that must exist is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A part is not UTF-8 text.
    #[error("Part {0} is not valid UTF-8")]
    Encoding(String),

    /// A part is not well-formed XML.
    #[error("XML parse error in {part}: {message}")]
    Xml { part: String, message: String },

    /// A part is well-formed but structurally wrong.
    #[error("Invalid structure in {part}: {message}")]
    Structure { part: String, message: String },
}
