//! Flat input rows and the readers producing them.
//!
//! Rows are the boundary between raw tabular text and the
//! [TreeBuilder](crate::model::TreeBuilder). A [Row] only keeps the two
//! fields the builder needs, looked up once by the configured [Columns]:
//!
//! - `path`: the dotted / slashed identifier (absent if the column is missing)
//! - `weight`: the numeric field as text, coerced later by [parse_weight]
//!
//! # Formats
//! * [RowFormat::Csv] - delimited text with a header line, read with the
//!   `csv` crate. A cell missing from a short record reads as empty text.
//! * [RowFormat::Json] - an array of flat objects. String, number and
//!   boolean cells are taken as text, `null` counts as absent.

mod reader;
mod weight;

pub use reader::parse_rows;
pub use weight::parse_weight;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =#========================================================================#=
// ROW
// =#========================================================================#=
/// One flat input record carrying a path-like identifier and a weight.
///
/// Rows are read-only inputs; the builder never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Path identifier, `None` if the row has no such field
    pub path: Option<String>,
    /// Weight as text, `None` if the row has no such field
    pub weight: Option<String>,
}

impl Row {
    /// Creates a row with both fields present.
    ///
    /// # Example
    /// ```
    /// use rowtree::rows::Row;
    ///
    /// let row = Row::new("flare.analytics.cluster", "3938");
    /// assert_eq!(row.path.as_deref(), Some("flare.analytics.cluster"));
    /// ```
    pub fn new(path: impl Into<String>, weight: impl Into<String>) -> Self {
        Row {
            path: Some(path.into()),
            weight: Some(weight.into()),
        }
    }

    /// Creates a row without a weight field.
    pub fn without_weight(path: impl Into<String>) -> Self {
        Row {
            path: Some(path.into()),
            weight: None,
        }
    }
}

// =#========================================================================#=
// COLUMNS
// =#========================================================================#=
/// Names of the columns holding the path and the weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    /// Column with the path identifier
    pub path: String,
    /// Column with the numeric weight
    pub weight: String,
}

impl Columns {
    /// Creates a column mapping.
    pub fn new(path: impl Into<String>, weight: impl Into<String>) -> Self {
        Columns {
            path: path.into(),
            weight: weight.into(),
        }
    }

    /// Dotted package identifiers with sizes (`id`, `value`).
    pub fn flare() -> Self {
        Self::new("id", "value")
    }

    /// Source file paths with sizes (`pathname`, `size`).
    pub fn vue() -> Self {
        Self::new("pathname", "size")
    }

    /// Administrative district codes with population (`ID`, `POBL_2022`).
    pub fn districts() -> Self {
        Self::new("ID", "POBL_2022")
    }
}

// =#========================================================================#=
// ROW FORMAT
// =#========================================================================#=
/// Text format of a row source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFormat {
    /// Delimited text with a header line
    Csv,
    /// JSON array of flat objects
    Json,
}

impl RowFormat {
    /// Guesses the format: JSON if the first non-whitespace character opens
    /// an array, CSV otherwise.
    ///
    /// # Example
    /// ```
    /// use rowtree::rows::RowFormat;
    ///
    /// assert_eq!(RowFormat::detect(" [{\"id\": \"a\"}]"), RowFormat::Json);
    /// assert_eq!(RowFormat::detect("id,value\na,1"), RowFormat::Csv);
    /// ```
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('[') {
            RowFormat::Json
        } else {
            RowFormat::Csv
        }
    }
}

// =#========================================================================#=
// ROW ERROR
// =#========================================================================#=
/// Errors while reading rows from text.
#[derive(Debug, Error)]
pub enum RowError {
    /// The CSV reader failed.
    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON text is not well-formed.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON text is well-formed but not an array.
    #[error("JSON input is not an array of row objects")]
    NotAnArray,

    /// The path column is not part of the CSV header, so no row could be placed.
    #[error("column '{0}' not found in header")]
    MissingColumn(String),
}
