//! Row and column clean-up that returns a new [`Table`].
//!
//! None of these touch the input table. Numeric results are written back as
//! text: `{}` (shortest round-trip) except [`normalize_column`], which uses
//! six decimals.

use std::collections::BTreeSet;

use super::model::{numeric_column, parse_cell, ColumnRef, ParsePolicy, Row, Table};
use crate::analytics::descriptive::sum_sq_dev;
use crate::error::{AnalyticsError, Result};

impl Table {
    fn with_rows(&self, rows: Vec<Row>) -> Table {
        Table::new(self.header.clone(), rows)
    }
}

/// Drop every row that has at least one empty cell.
pub fn drop_rows_with_missing(table: &Table) -> Table {
    let rows = table
        .rows
        .iter()
        .filter(|row| row.iter().all(|cell| !cell.is_empty()))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Replace every empty cell with `default`.
pub fn fill_missing_with(table: &Table, default: &str) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| if cell.is_empty() { default.to_string() } else { cell.clone() })
                .collect()
        })
        .collect();
    table.with_rows(rows)
}

/// Natural logarithm of every cell in `column`.
///
/// Rows too short to have the column are kept unchanged.
///
/// # Errors
/// - `ParseFailure` for a non-numeric cell.
/// - `OutOfDomain` for a value `<= 0`.
pub fn log_transform(table: &Table, column: impl Into<ColumnRef>) -> Result<Table> {
    let col = table.resolve(&column.into())?;
    let mut rows = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let mut row = row.clone();
        if let Some(cell) = row.get_mut(col) {
            let v = parse_cell(cell).ok_or_else(|| AnalyticsError::ParseFailure {
                row: i,
                column: col,
                value: cell.clone(),
            })?;
            if v <= 0.0 {
                return Err(AnalyticsError::OutOfDomain { row: i, value: v });
            }
            *cell = v.ln().to_string();
        }
        rows.push(row);
    }
    Ok(table.with_rows(rows))
}

/// Min-max scale `column` into `[0, 1]`, six decimals.
///
/// Every cell must parse. A constant column becomes `"0"` throughout.
pub fn normalize_column(table: &Table, column: impl Into<ColumnRef>) -> Result<Table> {
    let col = table.resolve(&column.into())?;
    if table.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let values = numeric_column(&table.rows, col, ParsePolicy::Strict)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let rows = table
        .rows
        .iter()
        .zip(&values)
        .map(|(row, &v)| {
            let mut row = row.clone();
            row[col] = if max == min {
                "0".to_string()
            } else {
                format!("{:.6}", (v - min) / (max - min))
            };
            row
        })
        .collect();
    Ok(table.with_rows(rows))
}

/// Population z-score of `column`, computed over its parseable cells.
///
/// Unparseable cells and short rows are left as they are.
///
/// # Errors
/// - `EmptyInput` when no cell parses.
/// - `DegenerateDistribution` when all parseable values are equal.
pub fn standardize_column(table: &Table, column: impl Into<ColumnRef>) -> Result<Table> {
    let col = table.resolve(&column.into())?;
    let values = numeric_column(&table.rows, col, ParsePolicy::Skip)?;
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (sum_sq_dev(&values) / n).sqrt();
    if std_dev == 0.0 {
        return Err(AnalyticsError::DegenerateDistribution);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if let Some(cell) = row.get_mut(col) {
                if let Some(v) = parse_cell(cell) {
                    *cell = ((v - mean) / std_dev).to_string();
                }
            }
            row
        })
        .collect();
    Ok(table.with_rows(rows))
}

/// Remove the columns at `indices` from the header and from every row.
///
/// Out-of-range indices are ignored.
pub fn drop_columns(table: &Table, indices: &[usize]) -> Table {
    let dropped: BTreeSet<usize> = indices.iter().copied().collect();
    let keep = |cells: &[String]| -> Vec<String> {
        cells
            .iter()
            .enumerate()
            .filter(|(j, _)| !dropped.contains(j))
            .map(|(_, c)| c.clone())
            .collect()
    };
    Table::new(keep(&table.header), table.rows.iter().map(|r| keep(r)).collect())
}

/// Replace the header. The new header must have as many names as the old one.
pub fn rename_columns(table: &Table, header: Vec<String>) -> Result<Table> {
    if header.len() != table.header.len() {
        return Err(AnalyticsError::DimensionMismatch {
            expected: table.header.len(),
            actual: header.len(),
        });
    }
    Ok(Table::new(header, table.rows.clone()))
}
