//! SQLite schema for the relational backend.
//!
//! A single `artifacts` table holds every stored element. `kind` is the
//! artifact tag (`text`, `image`, `url`, `table`) and `position` the
//! element's index within its stream. Text and URL elements live in
//! `content`, tables in `content` as a JSON array of rows, and images in
//! `data` with their format hint in `format`.

use rusqlite::Connection;

use docsift_core::SiftResult;

/// SQL statement for creating the artifacts table.
pub const CREATE_ARTIFACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS artifacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('text', 'image', 'url', 'table')),
    position INTEGER NOT NULL,
    content TEXT,
    format TEXT,
    data BLOB,
    created_at TEXT NOT NULL
)
"#;

/// Index for read-back by source and kind.
pub const CREATE_ARTIFACTS_SOURCE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_artifacts_source_kind ON artifacts(source_name, kind)
"#;

/// Insert one element.
pub const INSERT_ARTIFACT: &str = r#"
INSERT INTO artifacts (source_name, kind, position, content, format, data, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

/// Select the elements of one stream in insertion order.
pub const SELECT_ARTIFACTS: &str = r#"
SELECT id, source_name, kind, position, content, format, data, created_at
FROM artifacts
WHERE source_name = ?1 AND kind = ?2
ORDER BY id
"#;

/// Initialize the artifacts schema.
pub fn init_schema(conn: &Connection) -> SiftResult<()> {
    conn.execute(CREATE_ARTIFACTS_TABLE, [])?;
    conn.execute(CREATE_ARTIFACTS_SOURCE_INDEX, [])?;
    Ok(())
}
