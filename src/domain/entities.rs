//! # Domain Entities
//!
//! The plain data structures the export pipeline passes around: column
//! descriptors, cells and rows, the per-run export settings and the
//! statistics reported when an export finishes.
//!
//! We use the `serde` crate (Serialize/Deserialize) where a struct can also
//! come from a YAML/JSON configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default number of rows fetched per round-trip.
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// What the pipeline does with a column, resolved once from driver metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    /// RAW, LONG RAW and BLOB. Values are externalized as blob files.
    Binary,
    /// Exported as an empty placeholder for every row.
    Unsupported,
}

impl ColumnKind {
    pub fn is_binary(self) -> bool {
        self == ColumnKind::Binary
    }
}

/// Static per-export metadata for one output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A single value as fetched from the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Text(String),
    Bytes(Vec<u8>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

impl From<Option<Vec<u8>>> for Cell {
    fn from(v: Option<Vec<u8>>) -> Self {
        v.map(Cell::Bytes).unwrap_or(Cell::Null)
    }
}

/// One result row, positionally aligned with the column descriptors.
pub type Row = Vec<Cell>;

/// Line ending used by the CSV sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    #[default]
    Lf,
    Crlf,
}

impl LineTerminator {
    pub fn as_str(self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::Crlf => "\r\n",
        }
    }
}

/// `ExportSettings` is the immutable context for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Rows per fetch. Bounds memory use to one batch at a time.
    pub batch_size: usize,
    /// Replacement text for NULL values. `None` writes an empty field.
    pub null_marker: Option<String>,
    pub line_terminator: LineTerminator,
    pub header: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            null_marker: None,
            line_terminator: LineTerminator::Lf,
            header: true,
        }
    }
}

/// Where externalized binary values go.
///
/// `abs_dir` is where files are written; `rel_dir` is how the CSV refers to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOutput {
    pub abs_dir: PathBuf,
    pub rel_dir: String,
}

impl BinaryOutput {
    pub fn new(abs_dir: impl Into<PathBuf>, rel_dir: impl Into<String>) -> Self {
        Self {
            abs_dir: abs_dir.into(),
            rel_dir: rel_dir.into(),
        }
    }

    /// The CSV cell value pointing at `filename`.
    pub fn reference(&self, filename: &str) -> String {
        format!("file://{}/{}", self.rel_dir, filename)
    }
}

/// A table name as given by the user: `TABLE` or `SCHEMA.TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub owner: Option<String>,
    pub name: String,
}

impl TableRef {
    /// The name exactly as it was qualified, used for file names and exclusions.
    pub fn qualified(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// A table column as reported by the data dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
}

/// `ExportStats` is the "Report Card" for one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportStats {
    pub rows: u64,
    pub batches: u64,
    pub blobs_written: u64,
    pub blobs_skipped: u64,
    /// Binary cells exported as empty strings because they had no payload.
    pub empty_payloads: u64,
    /// Wall-clock time in seconds.
    pub duration: f64,
}
