//! Connection capability for the relational backend.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::{params, Connection};

use docsift_core::{ArtifactKind, SiftError, SiftResult};

use super::schema::{init_schema, INSERT_ARTIFACT, SELECT_ARTIFACTS};

/// One row of the `artifacts` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    /// Row id; `None` until inserted.
    pub id: Option<i64>,
    pub source_name: String,
    pub kind: ArtifactKind,
    /// Index of the element within its artifact stream.
    pub position: i64,
    pub content: Option<String>,
    pub format: Option<String>,
    pub data: Option<Vec<u8>>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// What [`SqlStorage`](super::SqlStorage) needs from a database connection.
///
/// Implemented for SQLite by [`SqliteConnection`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
pub trait SqlConnection: Send {
    /// Create the `artifacts` table and its index if missing.
    fn ensure_schema(&mut self) -> SiftResult<()>;

    /// Insert rows atomically, returning how many were written.
    fn insert_rows(&mut self, rows: &[RecordRow]) -> SiftResult<usize>;

    /// Rows for one `(source_name, kind)` in insertion order.
    fn select_rows(&self, source_name: &str, kind: ArtifactKind) -> SiftResult<Vec<RecordRow>>;

    /// Release the connection. Later calls are no-ops.
    fn close(&mut self) -> SiftResult<()>;
}

/// SQLite connection backed by rusqlite.
pub struct SqliteConnection {
    conn: Option<Connection>,
    path: PathBuf,
}

impl SqliteConnection {
    /// Open or create the database at `path` (`:memory:` for an in-memory
    /// database). Any failure is `StorageUnavailable`.
    pub fn open(path: impl AsRef<Path>) -> SiftResult<Self> {
        let path = path.as_ref();

        let conn = if path.to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            // Ensure parent directory exists
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SiftError::storage_unavailable_with(
                        format!("cannot create database directory {}", parent.display()),
                        e,
                    )
                })?;
            }
            Connection::open(path)
        }
        .map_err(|e| {
            SiftError::storage_unavailable_with(
                format!("cannot open database {}", path.display()),
                e,
            )
        })?;

        Ok(Self {
            conn: Some(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying rusqlite connection, if still open.
    pub fn raw(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn live(&self) -> SiftResult<&Connection> {
        self.conn.as_ref().ok_or_else(closed)
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl SqlConnection for SqliteConnection {
    fn ensure_schema(&mut self) -> SiftResult<()> {
        init_schema(self.live()?)
    }

    fn insert_rows(&mut self, rows: &[RecordRow]) -> SiftResult<usize> {
        let conn = self.conn.as_mut().ok_or_else(closed)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_ARTIFACT)?;
            for row in rows {
                stmt.execute(params![
                    row.source_name,
                    row.kind.as_str(),
                    row.position,
                    row.content,
                    row.format,
                    row.data,
                    row.created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn select_rows(&self, source_name: &str, kind: ArtifactKind) -> SiftResult<Vec<RecordRow>> {
        let conn = self.live()?;
        let mut stmt = conn.prepare(SELECT_ARTIFACTS)?;

        let rows = stmt
            .query_map(params![source_name, kind.as_str()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<Vec<u8>>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, source_name, kind, position, content, format, data, created_at)| {
                    let kind = ArtifactKind::from_str(&kind).map_err(|_| {
                        SiftError::storage(format!("unknown artifact kind '{}' in row {}", kind, id))
                    })?;
                    Ok(RecordRow {
                        id: Some(id),
                        source_name,
                        kind,
                        position,
                        content,
                        format,
                        data,
                        created_at,
                    })
                },
            )
            .collect()
    }

    fn close(&mut self) -> SiftResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| SiftError::from(e))?;
        }
        Ok(())
    }
}

fn closed() -> SiftError {
    SiftError::storage_unavailable("database connection is closed")
}
