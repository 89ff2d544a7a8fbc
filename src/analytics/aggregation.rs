//! Group-by aggregation and two-key pivot tables.
//!
//! Both [`group_by`] and [`pivot`] parse the value column strictly: the first
//! unparseable cell aborts the whole operation with its row index, so an
//! aggregate never silently covers fewer rows than the caller sent.
//!
//! Reducers treat empty groups in one of three named ways, see
//! [`EmptyGroup`]. Groups built by [`group_by`] are never empty; empty groups
//! only appear when a caller assembles a [`GroupedResult`] by hand.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analytics::descriptive::{median_of_sorted, sorted_copy, sum_sq_dev};
use crate::data::model::{cell_at, numeric_cell, ColumnRef, Row, Table};
use crate::error::{AnalyticsError, Result};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported reducers, parsed once from `sum|mean|min|max|count|median|stddev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Aggregation {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    Median,
    StdDev,
}

/// What a reducer reports for a group with no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyGroup {
    /// The key is reported with 0 (count and sum of nothing).
    Zero,
    /// The key is left out of the result (min and max).
    Omit,
    /// The key is reported with 0.0 as a stand-in (mean, median, stddev).
    Placeholder,
}

impl Aggregation {
    pub const ALL: [Aggregation; 7] = [
        Aggregation::Sum,
        Aggregation::Mean,
        Aggregation::Min,
        Aggregation::Max,
        Aggregation::Count,
        Aggregation::Median,
        Aggregation::StdDev,
    ];

    /// The literal this reducer is parsed from.
    pub fn name(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Count => "count",
            Aggregation::Median => "median",
            Aggregation::StdDev => "stddev",
        }
    }

    pub fn empty_group(self) -> EmptyGroup {
        match self {
            Aggregation::Sum | Aggregation::Count => EmptyGroup::Zero,
            Aggregation::Min | Aggregation::Max => EmptyGroup::Omit,
            Aggregation::Mean | Aggregation::Median | Aggregation::StdDev => {
                EmptyGroup::Placeholder
            }
        }
    }

    /// Reduce one group. `None` only for an empty group under [`EmptyGroup::Omit`].
    ///
    /// A single value has a standard deviation of 0.
    pub fn reduce(self, xs: &[f64]) -> Option<f64> {
        if xs.is_empty() {
            return match self.empty_group() {
                EmptyGroup::Omit => None,
                EmptyGroup::Zero | EmptyGroup::Placeholder => Some(0.0),
            };
        }
        let n = xs.len() as f64;
        let value = match self {
            Aggregation::Sum => xs.iter().sum(),
            Aggregation::Mean => xs.iter().sum::<f64>() / n,
            Aggregation::Min => xs.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Count => n,
            Aggregation::Median => median_of_sorted(&sorted_copy(xs)),
            Aggregation::StdDev if xs.len() == 1 => 0.0,
            Aggregation::StdDev => (sum_sq_dev(xs) / (n - 1.0)).sqrt(),
        };
        Some(value)
    }

    /// Reduce every group of `groups`, honouring [`Self::empty_group`].
    pub fn reduce_groups(self, groups: &GroupedResult) -> BTreeMap<String, f64> {
        groups
            .iter()
            .filter_map(|(key, values)| self.reduce(values).map(|v| (key.clone(), v)))
            .collect()
    }
}

impl FromStr for Aggregation {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Aggregation::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| AnalyticsError::UnknownMethod { name: s.to_string() })
    }
}

impl TryFrom<String> for Aggregation {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// GROUP BY
// ============================================================================

/// Group key → values, in input row order within each group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedResult(BTreeMap<String, Vec<f64>>);

impl GroupedResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the group `key`, creating it if needed.
    pub fn push(&mut self, key: impl Into<String>, value: f64) {
        self.0.entry(key.into()).or_default().push(value);
    }

    /// Values of one group.
    pub fn get(&self, key: &str) -> Result<&[f64]> {
        self.0
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| AnalyticsError::KeyNotFound { key: key.to_string() })
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<f64>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Vec<f64>>> for GroupedResult {
    fn from(map: BTreeMap<String, Vec<f64>>) -> Self {
        GroupedResult(map)
    }
}

/// Group the rows of `table` by the `key` column, collecting `value` as numbers.
///
/// ```
/// use tabstat::analytics::aggregation::{group_by, grouped_sum};
/// use tabstat::data::model::Table;
///
/// let t = Table::from_strs(&["k", "v"], &[&["A", "10"], &["A", "20"], &["B", "5"]]);
/// let sums = grouped_sum(&group_by(&t, "k", "v").unwrap());
/// assert_eq!(sums["A"], 30.0);
/// assert_eq!(sums["B"], 5.0);
/// ```
pub fn group_by(
    table: &Table,
    key: impl Into<ColumnRef>,
    value: impl Into<ColumnRef>,
) -> Result<GroupedResult> {
    let key_col = table.resolve(&key.into())?;
    let val_col = table.resolve(&value.into())?;
    group_rows(&table.rows, key_col, val_col)
}

/// [`group_by`] over bare rows with column indices.
pub fn group_rows(rows: &[Row], key_col: usize, val_col: usize) -> Result<GroupedResult> {
    let mut groups = GroupedResult::new();
    for (i, row) in rows.iter().enumerate() {
        let key = cell_at(row, i, key_col)?;
        let value = numeric_cell(row, i, val_col)?;
        groups.push(key, value);
    }
    log::trace!("grouped {} rows into {} groups", rows.len(), groups.len());
    Ok(groups)
}

pub fn grouped_sum(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::Sum.reduce_groups(groups)
}

/// Mean per group; empty groups report 0.
pub fn grouped_mean(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::Mean.reduce_groups(groups)
}

/// Number of values per group. Every key is present, empty groups as 0.
pub fn grouped_count(groups: &GroupedResult) -> BTreeMap<String, usize> {
    groups
        .iter()
        .map(|(key, values)| (key.clone(), values.len()))
        .collect()
}

/// Minimum per group; empty groups are omitted.
pub fn grouped_min(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::Min.reduce_groups(groups)
}

/// Maximum per group; empty groups are omitted.
pub fn grouped_max(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::Max.reduce_groups(groups)
}

pub fn grouped_median(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::Median.reduce_groups(groups)
}

/// Sample standard deviation per group; one value gives 0, empty groups 0.
pub fn grouped_std_dev(groups: &GroupedResult) -> BTreeMap<String, f64> {
    Aggregation::StdDev.reduce_groups(groups)
}

// ============================================================================
// PIVOT
// ============================================================================

/// Row key → column key → reduced value. Both key spaces come from the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PivotTable(BTreeMap<String, BTreeMap<String, f64>>);

impl PivotTable {
    /// Value at (`row`, `col`).
    pub fn cell(&self, row: &str, col: &str) -> Result<f64> {
        let cols = self
            .0
            .get(row)
            .ok_or_else(|| AnalyticsError::KeyNotFound { key: row.to_string() })?;
        cols.get(col)
            .copied()
            .ok_or_else(|| AnalyticsError::KeyNotFound { key: col.to_string() })
    }

    /// Columns of one row key.
    pub fn row(&self, row: &str) -> Option<&BTreeMap<String, f64>> {
        self.0.get(row)
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Union of column keys over all rows, sorted.
    pub fn column_keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.0.values().flat_map(|cols| cols.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Every populated cell as `(row, col, value)`.
    pub fn cells(&self) -> impl Iterator<Item = (&String, &String, f64)> {
        self.0
            .iter()
            .flat_map(|(r, cols)| cols.iter().map(move |(c, v)| (r, c, *v)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Two-level group-by reduced with `aggregation`.
pub fn pivot(
    table: &Table,
    row_key: impl Into<ColumnRef>,
    col_key: impl Into<ColumnRef>,
    value: impl Into<ColumnRef>,
    aggregation: Aggregation,
) -> Result<PivotTable> {
    // Pivot cells are never empty, so `reduce` always yields a value.
    pivot_with(table, row_key, col_key, value, |xs| {
        aggregation.reduce(xs).unwrap_or(0.0)
    })
}

/// Two-level group-by reduced with a caller-supplied reducer.
///
/// The reducer is only ever called with non-empty slices.
pub fn pivot_with<F>(
    table: &Table,
    row_key: impl Into<ColumnRef>,
    col_key: impl Into<ColumnRef>,
    value: impl Into<ColumnRef>,
    reducer: F,
) -> Result<PivotTable>
where
    F: Fn(&[f64]) -> f64,
{
    let row_col = table.resolve(&row_key.into())?;
    let col_col = table.resolve(&col_key.into())?;
    let val_col = table.resolve(&value.into())?;

    let mut cells: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        let r = cell_at(row, i, row_col)?;
        let c = cell_at(row, i, col_col)?;
        let v = numeric_cell(row, i, val_col)?;
        cells
            .entry(r.to_string())
            .or_default()
            .entry(c.to_string())
            .or_default()
            .push(v);
    }

    let reduced = cells
        .into_iter()
        .map(|(r, cols)| {
            let cols = cols
                .into_iter()
                .map(|(c, values)| (c, reducer(&values)))
                .collect();
            (r, cols)
        })
        .collect();
    Ok(PivotTable(reduced))
}

macro_rules! pivot_wrapper {
    ($(#[$doc:meta])* $name:ident, $agg:expr) => {
        $(#[$doc])*
        pub fn $name(
            table: &Table,
            row_key: impl Into<ColumnRef>,
            col_key: impl Into<ColumnRef>,
            value: impl Into<ColumnRef>,
        ) -> Result<PivotTable> {
            pivot(table, row_key, col_key, value, $agg)
        }
    };
}

pivot_wrapper!(pivot_sum, Aggregation::Sum);
pivot_wrapper!(pivot_mean, Aggregation::Mean);
pivot_wrapper!(pivot_min, Aggregation::Min);
pivot_wrapper!(pivot_max, Aggregation::Max);
pivot_wrapper!(pivot_count, Aggregation::Count);
pivot_wrapper!(pivot_median, Aggregation::Median);
pivot_wrapper!(
    /// Sample standard deviation per cell; a single-value cell is 0.
    pivot_std_dev,
    Aggregation::StdDev
);
