//! Relational storage backend.
//!
//! [`SqlStorage`] turns each artifact stream into one row per element of the
//! `artifacts` table (see [`schema`]). It talks to the database through the
//! [`SqlConnection`] capability, so the SQLite connection can be replaced by a
//! test double without touching `store` or `close`.

mod connection;
pub mod schema;

pub use connection::{RecordRow, SqlConnection, SqliteConnection};

#[cfg(test)]
pub use connection::MockSqlConnection;

use std::path::{Path, PathBuf};

use docsift_core::config::DEFAULT_DATABASE_PATH;
use docsift_core::{
    Artifact, ArtifactKind, ExtractedImage, SiftError, SiftResult, Storage, Table,
};

/// Decoded payload of a stored element.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Text(String),
    Image(ExtractedImage),
    Url(String),
    Table(Table),
}

/// A stored element read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub source_name: String,
    pub kind: ArtifactKind,
    pub position: i64,
    pub payload: RecordPayload,
    pub created_at: String,
}

/// SQLite-backed storage.
pub struct SqlStorage {
    connection: Box<dyn SqlConnection>,
    database_path: PathBuf,
    closed: bool,
}

impl SqlStorage {
    /// Open or create the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> SiftResult<Self> {
        let path = path.as_ref();
        let connection = SqliteConnection::open(path)?;
        Self::with_connection(Box::new(connection), path)
    }

    /// Open the database at the default location (`extracted_data.db`).
    pub fn open_default() -> SiftResult<Self> {
        Self::open(DEFAULT_DATABASE_PATH)
    }

    /// Build the backend over an existing connection.
    ///
    /// `database_path` is only recorded; the connection decides what it is
    /// actually talking to.
    pub fn with_connection(
        mut connection: Box<dyn SqlConnection>,
        database_path: impl Into<PathBuf>,
    ) -> SiftResult<Self> {
        let database_path = database_path.into();
        connection.ensure_schema().map_err(|e| {
            SiftError::storage_unavailable_with(
                format!("cannot initialise schema in {}", database_path.display()),
                e,
            )
        })?;

        tracing::info!("Opened SQL storage at {}", database_path.display());
        Ok(Self {
            connection,
            database_path,
            closed: false,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// The live connection object.
    pub fn connection(&self) -> &dyn SqlConnection {
        self.connection.as_ref()
    }

    /// Stored elements for one `(source_name, kind)` in insertion order.
    pub fn records(&self, source_name: &str, kind: ArtifactKind) -> SiftResult<Vec<StoredRecord>> {
        self.ensure_open()?;
        self.connection
            .select_rows(source_name, kind)?
            .into_iter()
            .map(decode)
            .collect()
    }

    fn ensure_open(&self) -> SiftResult<()> {
        if self.closed {
            return Err(SiftError::storage_unavailable("SQL storage is closed"));
        }
        Ok(())
    }
}

impl Storage for SqlStorage {
    fn store(&mut self, data: &Artifact, source_name: &str) -> SiftResult<()> {
        self.ensure_open()?;

        let rows = encode(data, source_name, &chrono::Utc::now().to_rfc3339())?;
        let written = self.connection.insert_rows(&rows)?;

        tracing::debug!(
            "Stored {} {} row(s) for {} in {}",
            written,
            data.kind(),
            source_name,
            self.database_path.display()
        );
        Ok(())
    }

    fn close(&mut self) -> SiftResult<()> {
        if self.closed {
            return Ok(());
        }
        self.connection.close()?;
        self.closed = true;
        tracing::info!("Closed SQL storage at {}", self.database_path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn encode(data: &Artifact, source_name: &str, created_at: &str) -> SiftResult<Vec<RecordRow>> {
    let row = |position: usize| RecordRow {
        id: None,
        source_name: source_name.to_string(),
        kind: data.kind(),
        position: position as i64,
        content: None,
        format: None,
        data: None,
        created_at: created_at.to_string(),
    };

    let rows = match data {
        Artifact::Text(units) => units
            .iter()
            .enumerate()
            .map(|(i, unit)| RecordRow {
                content: Some(unit.clone()),
                ..row(i)
            })
            .collect(),
        Artifact::Url(urls) => urls
            .iter()
            .enumerate()
            .map(|(i, url)| RecordRow {
                content: Some(url.clone()),
                ..row(i)
            })
            .collect(),
        Artifact::Image(images) => images
            .iter()
            .enumerate()
            .map(|(i, image)| RecordRow {
                format: Some(image.format.clone()),
                data: Some(image.data.clone()),
                ..row(i)
            })
            .collect(),
        Artifact::Table(tables) => tables
            .iter()
            .enumerate()
            .map(|(i, table)| -> SiftResult<RecordRow> {
                Ok(RecordRow {
                    content: Some(serde_json::to_string(table)?),
                    ..row(i)
                })
            })
            .collect::<SiftResult<Vec<_>>>()?,
    };
    Ok(rows)
}

fn decode(row: RecordRow) -> SiftResult<StoredRecord> {
    let id = row.id.unwrap_or_default();
    let content = |content: Option<String>| {
        content.ok_or_else(|| SiftError::storage(format!("row {} has no content", id)))
    };

    let payload = match row.kind {
        ArtifactKind::Text => RecordPayload::Text(content(row.content)?),
        ArtifactKind::Url => RecordPayload::Url(content(row.content)?),
        ArtifactKind::Table => RecordPayload::Table(serde_json::from_str(&content(row.content)?)?),
        ArtifactKind::Image => {
            let data = row
                .data
                .ok_or_else(|| SiftError::storage(format!("row {} has no image data", id)))?;
            RecordPayload::Image(ExtractedImage::new(data, row.format.unwrap_or_default()))
        }
    };

    Ok(StoredRecord {
        id,
        source_name: row.source_name,
        kind: row.kind,
        position: row.position,
        payload,
        created_at: row.created_at,
    })
}
