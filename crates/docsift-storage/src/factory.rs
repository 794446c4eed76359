//! Factory for creating storage backends.

use std::path::Path;

use docsift_core::{SiftResult, Storage, StorageBackend, StorageConfig};

use crate::file::FileStorage;
use crate::sql::SqlStorage;

/// Factory for creating storage backends.
pub struct StorageFactory;

impl StorageFactory {
    /// Create the backend selected by `config.backend`.
    pub fn create(config: &StorageConfig) -> SiftResult<Box<dyn Storage>> {
        match config.backend {
            StorageBackend::File => Self::file(&config.output_dir),
            StorageBackend::Sqlite => Self::sqlite(&config.database_path),
        }
    }

    /// Create a file backend writing under `output_dir`.
    pub fn file(output_dir: impl AsRef<Path>) -> SiftResult<Box<dyn Storage>> {
        Ok(Box::new(FileStorage::new(output_dir.as_ref())?))
    }

    /// Create a SQLite backend at `database_path`.
    pub fn sqlite(database_path: impl AsRef<Path>) -> SiftResult<Box<dyn Storage>> {
        Ok(Box::new(SqlStorage::open(database_path)?))
    }
}
