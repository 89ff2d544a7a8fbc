//! Pearson and Spearman correlation, statistical ranks and correlation matrices.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::model::{numeric_column, ColumnRef, ParsePolicy, Table};
use crate::error::{AnalyticsError, Result};

/// Correlation coefficient used by [`correlation_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

impl CorrelationMethod {
    pub fn name(self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
        }
    }

    /// Correlate two sequences with this method.
    pub fn correlate(self, x: &[f64], y: &[f64]) -> Result<f64> {
        match self {
            CorrelationMethod::Pearson => pearson(x, y),
            CorrelationMethod::Spearman => spearman(x, y),
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = AnalyticsError;

    /// Accepts exactly `pearson` or `spearman`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            other => Err(AnalyticsError::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CorrelationMethod {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_pair(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(AnalyticsError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    Ok(())
}

/// Pearson product-moment correlation coefficient.
///
/// Computed from running sums:
///
/// ```text
/// r = (nΣxy − ΣxΣy) / √((nΣx² − (Σx)²)(nΣy² − (Σy)²))
/// ```
///
/// # Errors
/// - `DimensionMismatch` when the lengths differ.
/// - `EmptyInput` for empty sequences.
/// - `ZeroVariance` when either sequence is constant.
///
/// ```
/// use tabstat::analytics::correlation::pearson;
/// let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
/// assert!((r - 1.0).abs() < 1e-12);
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pair(x, y)?;
    let n = x.len() as f64;

    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxy += a * b;
        sxx += a * a;
        syy += b * b;
    }

    let numerator = n * sxy - sx * sy;
    let denominator = ((n * sxx - sx * sx) * (n * syy - sy * sy)).sqrt();
    if denominator == 0.0 || denominator.is_nan() {
        return Err(AnalyticsError::ZeroVariance);
    }
    Ok(numerator / denominator)
}

/// Zero-based ascending ranks, ties sharing the average of their positions.
///
/// ```
/// use tabstat::analytics::correlation::rank;
/// assert_eq!(rank(&[10.0, 30.0, 20.0, 30.0]).unwrap(), vec![0.0, 2.5, 1.0, 2.5]);
/// ```
pub fn rank(xs: &[f64]) -> Result<Vec<f64>> {
    if xs.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

    let mut ranks = vec![0.0; xs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && xs[order[j]] == xs[order[i]] {
            j += 1;
        }
        // Positions i..j hold one tied value.
        let shared = (i + j - 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = shared;
        }
        i = j;
    }
    Ok(ranks)
}

/// Spearman rank correlation: Pearson over the ranks of both sequences.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pair(x, y)?;
    pearson(&rank(x)?, &rank(y)?)
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Symmetric correlation matrix with one label per selected column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub matrix: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl CorrelationResult {
    /// `label → label → coefficient`. Duplicate labels collapse to one entry.
    pub fn to_nested_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.labels
            .iter()
            .zip(&self.matrix)
            .map(|(row_label, row)| {
                let cols = self.labels.iter().cloned().zip(row.iter().copied()).collect();
                (row_label.clone(), cols)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Pairwise correlations of the selected columns.
///
/// Every column is parsed strictly: one bad cell fails the whole matrix.
/// Only the lower triangle (`j ≤ i`) is computed and mirrored.
///
/// # Errors
/// - `EmptyInput` when no columns are selected.
/// - `ColumnNotFound`, `ParseFailure`, `RowTooShort` from extraction.
/// - Any error of the chosen coefficient (`EmptyInput`, `ZeroVariance`).
pub fn correlation_matrix(
    table: &Table,
    columns: &[ColumnRef],
    method: CorrelationMethod,
) -> Result<CorrelationResult> {
    if columns.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut labels = Vec::with_capacity(columns.len());
    let mut series = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = table.resolve(column)?;
        series.push(numeric_column(&table.rows, idx, ParsePolicy::Strict)?);
        labels.push(table.label(idx));
    }

    let k = series.len();
    let mut matrix = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..=i {
            let r = method.correlate(&series[i], &series[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    log::debug!("{method} correlation matrix over {k} columns, {} rows", table.len());

    Ok(CorrelationResult { matrix, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pearson_of_positive_affine_map_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_of_negative_map_is_minus_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson(&x, &y).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_errors() {
        assert_eq!(
            pearson(&[1.0, 2.0], &[1.0]),
            Err(AnalyticsError::DimensionMismatch { expected: 2, actual: 1 })
        );
        assert_eq!(pearson(&[], &[]), Err(AnalyticsError::EmptyInput));
        assert_eq!(
            pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]),
            Err(AnalyticsError::ZeroVariance)
        );
    }

    #[test]
    fn rank_identity_and_ties() {
        assert_eq!(rank(&[0.0, 1.0, 2.0, 3.0]).unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(rank(&[3.0, 1.0, 2.0]).unwrap(), vec![2.0, 0.0, 1.0]);
        assert_eq!(rank(&[1.0, 2.0, 5.0, 5.0]).unwrap(), vec![0.0, 1.0, 2.5, 2.5]);
        assert_eq!(rank(&[7.0, 7.0, 7.0]).unwrap(), vec![1.0, 1.0, 1.0]);
        assert_eq!(rank(&[]), Err(AnalyticsError::EmptyInput));
    }

    #[test]
    fn spearman_checks_lengths_first() {
        assert!(matches!(
            spearman(&[1.0], &[]),
            Err(AnalyticsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn spearman_ignores_monotone_transform() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert_relative_eq!(spearman(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn method_parsing_is_exact() {
        assert_eq!("pearson".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Pearson);
        assert_eq!("spearman".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Spearman);
        assert_eq!(
            "Pearson".parse::<CorrelationMethod>(),
            Err(AnalyticsError::UnknownMethod { name: "Pearson".into() })
        );
        assert!("kendall".parse::<CorrelationMethod>().is_err());
    }

    fn metrics() -> Table {
        Table::from_strs(
            &["a", "", "c"],
            &[
                &["1", "2", "9"],
                &["2", "4", "7"],
                &["3", "7", "8"],
                &["4", "8", "1"],
            ],
        )
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let cols: Vec<ColumnRef> = vec!["a".into(), 1usize.into(), "c".into()];
        let res = correlation_matrix(&metrics(), &cols, CorrelationMethod::Pearson).unwrap();
        assert_eq!(res.labels, vec!["a", "Col1", "c"]);
        for i in 0..3 {
            assert_relative_eq!(res.matrix[i][i], 1.0, epsilon = 1e-12);
            for j in 0..3 {
                assert_eq!(res.matrix[i][j], res.matrix[j][i]);
            }
        }
        assert_relative_eq!(
            res.matrix[0][1],
            pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 7.0, 8.0]).unwrap()
        );
    }

    #[test]
    fn matrix_nested_map_shape() {
        let cols: Vec<ColumnRef> = vec!["a".into(), "c".into()];
        let res = correlation_matrix(&metrics(), &cols, CorrelationMethod::Spearman).unwrap();
        let map = res.to_nested_map();
        assert_eq!(map["a"]["c"], map["c"]["a"]);
        assert_relative_eq!(map["a"]["a"], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn matrix_fails_on_any_bad_cell() {
        let mut t = metrics();
        t.rows[2][2] = "NA".into();
        let cols: Vec<ColumnRef> = vec!["a".into(), "c".into()];
        assert!(matches!(
            correlation_matrix(&t, &cols, CorrelationMethod::Pearson),
            Err(AnalyticsError::ParseFailure { row: 2, column: 2, .. })
        ));
        assert_eq!(
            correlation_matrix(&t, &[], CorrelationMethod::Pearson),
            Err(AnalyticsError::EmptyInput)
        );
    }
}
