//! Configuration system for docsift.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{SiftError, SiftResult};

/// Default SQLite database location, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "extracted_data.db";

/// Default output directory for the file backend.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type.
    pub backend: StorageBackend,
    /// Output directory for the file backend.
    pub output_dir: PathBuf,
    /// Database location for the SQLite backend.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// Extraction tuning shared by all formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Also collect URL-like substrings found in the extracted text.
    pub detect_bare_urls: bool,
    /// Minimum consecutive aligned lines for a PDF text block to count as a table.
    pub min_table_rows: usize,
    /// Minimum cells per line for a PDF text line to count as a table row.
    pub min_table_columns: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            detect_bare_urls: true,
            min_table_rows: 2,
            min_table_columns: 2,
        }
    }
}

/// Main docsift configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Extraction configuration.
    pub extraction: ExtractionConfig,
}

impl SiftConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SiftResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| SiftError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SiftError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| SiftError::Configuration(e.to_string())),
            _ => Err(SiftError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(backend) = std::env::var("DOCSIFT_STORAGE_BACKEND") {
            config.storage.backend = match backend.to_lowercase().as_str() {
                "sqlite" | "sql" => StorageBackend::Sqlite,
                _ => StorageBackend::File,
            };
        }
        if let Ok(dir) = std::env::var("DOCSIFT_OUTPUT_DIR") {
            config.storage.output_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("DOCSIFT_DATABASE_PATH") {
            config.storage.database_path = PathBuf::from(path);
        }
        if let Ok(flag) = std::env::var("DOCSIFT_DETECT_BARE_URLS") {
            config.extraction.detect_bare_urls =
                !matches!(flag.to_lowercase().as_str(), "0" | "false" | "no" | "off");
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> SiftConfigBuilder {
        SiftConfigBuilder::default()
    }
}

/// Builder for SiftConfig.
#[derive(Default)]
pub struct SiftConfigBuilder {
    config: SiftConfig,
}

impl SiftConfigBuilder {
    /// Set the storage backend.
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage.backend = backend;
        self
    }

    /// Set the file backend's output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage.output_dir = dir.into();
        self
    }

    /// Set the SQLite database location.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage.database_path = path.into();
        self
    }

    /// Set extraction configuration.
    pub fn extraction(mut self, config: ExtractionConfig) -> Self {
        self.config.extraction = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SiftConfig {
        self.config
    }
}
