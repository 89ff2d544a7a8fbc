use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::{cell_at, parse_cell, Row, Table};
use crate::error::{AnalyticsError, Result};

// ---------------------------------------------------------------------------
// Filter / sort options
// ---------------------------------------------------------------------------

/// Comparison applied by a [`FilterOption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterOperator {
    /// Exact string equality.
    Eq,
    /// Case-insensitive substring.
    Contains,
    Gt,
    Lt,
    Ge,
    Le,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Contains => "contains",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Ge => "ge",
            FilterOperator::Le => "le",
        }
    }

    /// Whether `cell` passes the comparison against `value`.
    ///
    /// Numeric operators never match when either side fails to parse.
    pub fn matches(self, cell: &str, value: &str) -> bool {
        match self {
            FilterOperator::Eq => cell == value,
            FilterOperator::Contains => cell.to_lowercase().contains(&value.to_lowercase()),
            FilterOperator::Gt | FilterOperator::Lt | FilterOperator::Ge | FilterOperator::Le => {
                let (Some(a), Some(b)) = (parse_cell(cell), parse_cell(value)) else {
                    return false;
                };
                match self {
                    FilterOperator::Gt => a > b,
                    FilterOperator::Lt => a < b,
                    FilterOperator::Ge => a >= b,
                    _ => a <= b,
                }
            }
        }
    }
}

impl FromStr for FilterOperator {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eq" => Ok(FilterOperator::Eq),
            "contains" => Ok(FilterOperator::Contains),
            "gt" => Ok(FilterOperator::Gt),
            "lt" => Ok(FilterOperator::Lt),
            "ge" => Ok(FilterOperator::Ge),
            "le" => Ok(FilterOperator::Le),
            other => Err(AnalyticsError::UnsupportedOperation {
                name: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep rows whose `column` cell satisfies `op` against `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub column: String,
    pub op: FilterOperator,
    pub value: String,
}

impl FilterOption {
    /// Build a filter from a textual operator.
    pub fn new(column: impl Into<String>, op: &str, value: impl Into<String>) -> Result<Self> {
        Ok(FilterOption {
            column: column.into(),
            op: op.parse()?,
            value: value.into(),
        })
    }
}

/// Sort direction, parsed case-insensitively from `asc` / `desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(AnalyticsError::UnsupportedOperation {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => "asc".to_string(),
            SortOrder::Desc => "desc".to_string(),
        }
    }
}

/// Sort rows by the cells of one named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOption {
    pub column: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortOption {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        SortOption {
            column: column.into(),
            order,
        }
    }
}

// ---------------------------------------------------------------------------
// Query-parameter parsing
// ---------------------------------------------------------------------------

fn first_param<'a>(params: &'a HashMap<String, Vec<String>>, key: &str) -> &'a str {
    params
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
        .unwrap_or("")
}

/// Read `sort_by`, `order`, `filter_col`, `filter_op` and `filter_val` from
/// multi-valued query parameters. Only the first value of each key is used.
///
/// A sort is produced when `sort_by` is set (`order` defaults to `asc`). A
/// filter is produced only when column, operator and value are all non-empty.
pub fn parse_filter_sort(
    params: &HashMap<String, Vec<String>>,
) -> Result<(Vec<FilterOption>, Option<SortOption>)> {
    let sort_by = first_param(params, "sort_by");
    let sort = if sort_by.is_empty() {
        None
    } else {
        let order = match first_param(params, "order") {
            "" => SortOrder::Asc,
            o => o.parse()?,
        };
        Some(SortOption::new(sort_by, order))
    };

    let column = first_param(params, "filter_col");
    let op = first_param(params, "filter_op");
    let value = first_param(params, "filter_val");
    let mut filters = Vec::new();
    if !column.is_empty() && !op.is_empty() && !value.is_empty() {
        filters.push(FilterOption::new(column, &op.to_lowercase(), value)?);
    }

    Ok((filters, sort))
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

fn header_index(header: &[String], column: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| AnalyticsError::ColumnNotFound {
            name: column.to_string(),
        })
}

/// Numeric when both cells parse, byte-wise string order otherwise.
fn cell_less(a: &str, b: &str) -> bool {
    match (parse_cell(a), parse_cell(b)) {
        (Some(x), Some(y)) => x < y,
        _ => a < b,
    }
}

/// Return a stably sorted copy of `rows`.
///
/// `None` returns the rows unchanged. Mixed numeric/text columns may compare
/// non-transitively; the result is still a permutation of the input.
pub fn apply_sort(rows: &[Row], header: &[String], sort: Option<&SortOption>) -> Result<Vec<Row>> {
    let indexed = rows.iter().cloned().enumerate().collect();
    Ok(strip_index(sort_indexed(indexed, header, sort)?))
}

/// Apply every filter in turn (logical AND), then the optional sort.
///
/// Errors report the row's position in `rows`, however many filters ran first.
pub fn apply_filter_sort(
    rows: &[Row],
    header: &[String],
    filters: &[FilterOption],
    sort: Option<&SortOption>,
) -> Result<Vec<Row>> {
    let mut kept: Vec<(usize, Row)> = rows.iter().cloned().enumerate().collect();
    for filter in filters {
        let col = header_index(header, &filter.column)?;
        let mut next = Vec::with_capacity(kept.len());
        for (i, row) in kept {
            if filter.op.matches(cell_at(&row, i, col)?, &filter.value) {
                next.push((i, row));
            }
        }
        log::trace!("filter {} {} {:?}: {} rows left", filter.column, filter.op, filter.value, next.len());
        kept = next;
    }
    Ok(strip_index(sort_indexed(kept, header, sort)?))
}

/// Sort rows tagged with their input position.
fn sort_indexed(
    rows: Vec<(usize, Row)>,
    header: &[String],
    sort: Option<&SortOption>,
) -> Result<Vec<(usize, Row)>> {
    let Some(sort) = sort else {
        return Ok(rows);
    };
    let col = header_index(header, &sort.column)?;
    for (i, row) in &rows {
        cell_at(row, *i, col)?;
    }

    let sorted = match sort.order {
        SortOrder::Asc => merge_sort(rows, &|a: &(usize, Row), b: &(usize, Row)| cell_less(&a.1[col], &b.1[col])),
        SortOrder::Desc => merge_sort(rows, &|a: &(usize, Row), b: &(usize, Row)| cell_less(&b.1[col], &a.1[col])),
    };
    Ok(sorted)
}

fn strip_index(rows: Vec<(usize, Row)>) -> Vec<Row> {
    rows.into_iter().map(|(_, row)| row).collect()
}

impl Table {
    /// Filter and sort this table's rows, keeping the header.
    pub fn filter_sort(&self, filters: &[FilterOption], sort: Option<&SortOption>) -> Result<Table> {
        let rows = apply_filter_sort(&self.rows, &self.header, filters, sort)?;
        Ok(Table::new(self.header.clone(), rows))
    }
}

/// Stable top-down merge sort driven by a strict "less than" predicate.
///
/// Never panics, whatever the predicate returns.
fn merge_sort<T, F>(mut items: Vec<T>, less: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, less);
    let right = merge_sort(right, less);

    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut l = left.into_iter().peekable();
    let mut r = right.into_iter().peekable();
    loop {
        // Ties take from the left run.
        let take_right = match (l.peek(), r.peek()) {
            (Some(a), Some(b)) => less(b, a),
            _ => break,
        };
        if take_right {
            out.extend(r.next());
        } else {
            out.extend(l.next());
        }
    }
    out.extend(l);
    out.extend(r);
    out
}
