//! Extracted artifact types.
//!
//! Every extraction operation produces one artifact stream. A stream is
//! either empty (nothing of that kind was found) or holds at least one
//! element; callers use emptiness to decide whether to persist it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Kind tag of an artifact stream, used as the storage key alongside the
/// source file name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Text,
    Image,
    Url,
    Table,
}

impl ArtifactKind {
    /// Lowercase tag (`text`, `image`, `url`, `table`).
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// An embedded image blob with a format hint (file extension such as
/// `png` or `jpg`, or `raw` when the bytes are not a standalone image file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Format hint.
    pub format: String,
}

impl ExtractedImage {
    pub fn new(data: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            data,
            format: format.into(),
        }
    }

    /// File extension to use when writing the blob to disk.
    pub fn extension(&self) -> &str {
        match self.format.as_str() {
            "" | "raw" => "bin",
            other => other,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A table: ordered rows of cell text. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// True when every row has the same number of cells.
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.rows.iter().all(|row| row.len() == width)
    }
}

impl From<Vec<Vec<String>>> for Table {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// One artifact stream, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Artifact {
    /// One string per logical unit (page, paragraph, slide).
    Text(Vec<String>),
    /// Embedded images in order of first appearance.
    Image(Vec<ExtractedImage>),
    /// Deduplicated link targets.
    Url(BTreeSet<String>),
    /// Tables in document order.
    Table(Vec<Table>),
}

impl Artifact {
    /// Kind tag of this stream.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Text(_) => ArtifactKind::Text,
            Artifact::Image(_) => ArtifactKind::Image,
            Artifact::Url(_) => ArtifactKind::Url,
            Artifact::Table(_) => ArtifactKind::Table,
        }
    }

    /// Number of elements in the stream.
    pub fn len(&self) -> usize {
        match self {
            Artifact::Text(units) => units.len(),
            Artifact::Image(images) => images.len(),
            Artifact::Url(urls) => urls.len(),
            Artifact::Table(tables) => tables.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
