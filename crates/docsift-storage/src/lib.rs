//! docsift-storage - Persistence backends for extracted artifacts.
//!
//! Two backends implement [`Storage`](docsift_core::Storage):
//!
//! - [`FileStorage`] writes one human-readable file (or image directory)
//!   per `(source, kind)` under an output directory.
//! - [`SqlStorage`] inserts one row per artifact element into a SQLite
//!   `artifacts` table.
//!
//! # Example
//!
//! ```ignore
//! use docsift_core::{Artifact, Storage, StorageConfig};
//! use docsift_storage::StorageFactory;
//!
//! let mut storage = StorageFactory::create(&StorageConfig::default())?;
//! storage.store(&Artifact::Text(pages), "report.pdf")?;
//! storage.close()?;
//! ```

mod factory;
mod file;
mod serialize;
pub mod sql;

pub use factory::StorageFactory;
pub use file::FileStorage;
pub use serialize::{render_tables, render_text, render_urls};
pub use sql::{RecordPayload, RecordRow, SqlConnection, SqlStorage, SqliteConnection, StoredRecord};
