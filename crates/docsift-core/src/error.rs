//! Error types for docsift operations.
//!
//! Loaders, extractors and storage backends share one error type so that a
//! caller driving the whole pipeline can match on a single taxonomy:
//! `InvalidFormat` (loader), `NotLoaded` and `ExtractionFailure`
//! (extractor), `StorageUnavailable` and `Storage` (backends).

use thiserror::Error;

use crate::types::{ArtifactKind, DocumentFormat};

/// Result type alias for docsift operations.
pub type SiftResult<T> = Result<T, SiftError>;

/// Why a loader rejected a file.
///
/// Never part of the user-facing message: a corrupted file and a file of
/// another format both read "Invalid PDF file.". The reason is kept for
/// diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The path does not exist or could not be read.
    Unreadable,
    /// The file is zero bytes long.
    EmptyFile,
    /// The bytes belong to a different container format.
    WrongFormat,
    /// The container is damaged or missing required parts.
    Malformed,
    /// The document is encrypted and needs a password.
    PasswordProtected,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::Unreadable => "unreadable",
            InvalidReason::EmptyFile => "empty file",
            InvalidReason::WrongFormat => "wrong format",
            InvalidReason::Malformed => "malformed",
            InvalidReason::PasswordProtected => "password protected",
        }
    }
}

/// Main error type for all docsift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// The loader rejected the file.
    #[error("Invalid {} file.", .format.label())]
    InvalidFormat {
        format: DocumentFormat,
        reason: InvalidReason,
    },

    /// An extraction operation ran before a document was loaded.
    #[error("No {} document loaded; call load() first", .format.label())]
    NotLoaded { format: DocumentFormat },

    /// A loaded document contains a malformed element.
    #[error("{} {kind} extraction failed: {message}", .format.label())]
    ExtractionFailure {
        format: DocumentFormat,
        kind: ArtifactKind,
        message: String,
    },

    /// The storage backend could not be opened, or was already closed.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A write to an open storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FmtInvalid,
    ExtNotLoaded,
    ExtFailed,
    StoUnavailable,
    StoWriteFailed,
    CfgInvalid,
    Io,
    Serialization,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FmtInvalid => "FMT_001",
            ErrorCode::ExtNotLoaded => "EXT_001",
            ErrorCode::ExtFailed => "EXT_002",
            ErrorCode::StoUnavailable => "STO_001",
            ErrorCode::StoWriteFailed => "STO_002",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::Io => "IO_001",
            ErrorCode::Serialization => "SER_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl SiftError {
    /// Create an invalid format error.
    pub fn invalid_format(format: DocumentFormat, reason: InvalidReason) -> Self {
        Self::InvalidFormat { format, reason }
    }

    /// Create an extraction failure scoped to one artifact kind.
    pub fn extraction(
        format: DocumentFormat,
        kind: ArtifactKind,
        message: impl Into<String>,
    ) -> Self {
        Self::ExtractionFailure {
            format,
            kind,
            message: message.into(),
        }
    }

    /// Create a storage unavailable error.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage unavailable error wrapping its cause.
    pub fn storage_unavailable_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage write error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidFormat { .. } => ErrorCode::FmtInvalid,
            Self::NotLoaded { .. } => ErrorCode::ExtNotLoaded,
            Self::ExtractionFailure { .. } => ErrorCode::ExtFailed,
            Self::StorageUnavailable { .. } => ErrorCode::StoUnavailable,
            Self::Storage { .. } => ErrorCode::StoWriteFailed,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Io(_) => ErrorCode::Io,
            Self::Serialization(_) => ErrorCode::Serialization,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// The loader's rejection reason, if this is an `InvalidFormat` error.
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        match self {
            Self::InvalidFormat { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidFormat { reason, .. } => match reason {
                InvalidReason::Unreadable => Some("Please check that the file exists and is readable"),
                InvalidReason::PasswordProtected => {
                    Some("Remove the password protection before extracting")
                }
                _ => Some("Please check that the file matches the selected format"),
            },
            Self::NotLoaded { .. } => Some("Call load() with a document path first"),
            Self::StorageUnavailable { .. } => {
                Some("Please check the storage location and its permissions")
            }
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SiftError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
