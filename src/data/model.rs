use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

// ---------------------------------------------------------------------------
// Row / Table – the engine's sole input shape
// ---------------------------------------------------------------------------

/// One row of text cells. Its length need not match the header.
pub type Row = Vec<String>;

/// A header plus rows of text cells, as handed over by the storage layer.
///
/// Header names are not required to be unique; lookups by name return the
/// first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Ordered column names.
    pub header: Vec<String>,
    /// Ordered rows.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        Table { header, rows }
    }

    /// Build a table from string slices; handy for fixtures.
    pub fn from_strs(header: &[&str], rows: &[&[&str]]) -> Self {
        Table {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Resolve a selector to a column index.
    ///
    /// Names must exist in the header. Indices are returned as given; rows
    /// that are too short for them fail later, per row.
    pub fn resolve(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Index(i) => Ok(*i),
            ColumnRef::Name(name) => {
                self.column_index(name)
                    .ok_or_else(|| AnalyticsError::ColumnNotFound { name: name.clone() })
            }
        }
    }

    /// Display label for a column index: the header name, or `Col{index}`
    /// when the header is missing or blank there.
    pub fn label(&self, index: usize) -> String {
        match self.header.get(index) {
            Some(h) if !h.is_empty() => h.clone(),
            _ => format!("Col{index}"),
        }
    }

    /// Extract a column as numbers under the given parse policy.
    pub fn numeric_column(&self, column: impl Into<ColumnRef>, policy: ParsePolicy) -> Result<Vec<f64>> {
        let col = self.resolve(&column.into())?;
        numeric_column(&self.rows, col, policy)
    }
}

// ---------------------------------------------------------------------------
// ColumnRef – column selector by name or zero-based index
// ---------------------------------------------------------------------------

/// Selects a column either by header name or by zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<&String> for ColumnRef {
    fn from(name: &String) -> Self {
        ColumnRef::Name(name.clone())
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&ColumnRef> for ColumnRef {
    fn from(column: &ColumnRef) -> Self {
        column.clone()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{i}"),
            ColumnRef::Name(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// How text cells become numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Any unparseable cell or short row fails the whole extraction.
    #[default]
    Strict,
    /// Unparseable cells and short rows are silently skipped.
    Skip,
}

/// Parse one cell as `f64`. The text is not trimmed.
pub fn parse_cell(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok()
}

/// Cell at `col` of row number `row`, or a `RowTooShort` error.
pub fn cell_at(cells: &[String], row: usize, col: usize) -> Result<&str> {
    cells
        .get(col)
        .map(String::as_str)
        .ok_or(AnalyticsError::RowTooShort {
            row,
            column: col,
            len: cells.len(),
        })
}

/// Parse the cell at `col` strictly, with row-indexed errors.
pub fn numeric_cell(cells: &[String], row: usize, col: usize) -> Result<f64> {
    let text = cell_at(cells, row, col)?;
    parse_cell(text).ok_or_else(|| AnalyticsError::ParseFailure {
        row,
        column: col,
        value: text.to_string(),
    })
}

/// Extract column `col` of `rows` as numbers.
pub fn numeric_column(rows: &[Row], col: usize, policy: ParsePolicy) -> Result<Vec<f64>> {
    match policy {
        ParsePolicy::Strict => rows
            .iter()
            .enumerate()
            .map(|(i, r)| numeric_cell(r, i, col))
            .collect(),
        ParsePolicy::Skip => Ok(rows
            .iter()
            .filter_map(|r| r.get(col).and_then(|c| parse_cell(c)))
            .collect()),
    }
}
