//! Scalar summaries of a numeric sequence.
//!
//! Every function except [`count`] fails with [`AnalyticsError::EmptyInput`]
//! on an empty slice. Variance and standard deviation are the **sample**
//! statistics (denominator `n − 1`) and need at least two values.
//!
//! ```
//! use tabstat::analytics::descriptive::{mean, median, std_dev};
//!
//! let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//! assert_eq!(mean(&v).unwrap(), 5.0);
//! assert_eq!(median(&v).unwrap(), 4.5);
//! assert!((std_dev(&v).unwrap() - 2.138).abs() < 1e-3);
//! ```

use serde::Serialize;

use crate::error::{AnalyticsError, Result};

fn non_empty(xs: &[f64]) -> Result<()> {
    if xs.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    Ok(())
}

/// Sum of all values.
pub fn sum(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    Ok(xs.iter().sum())
}

/// Arithmetic mean.
pub fn mean(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Median of a private sorted copy; the input is left untouched.
///
/// For an even number of values the two middle values are averaged.
pub fn median(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    let sorted = sorted_copy(xs);
    Ok(median_of_sorted(&sorted))
}

/// Every value tied for the highest frequency, in ascending order.
///
/// Ties are all reported; there is no tie-break.
///
/// ```
/// use tabstat::analytics::descriptive::mode;
/// assert_eq!(mode(&[1.0, 2.0, 2.0, 3.0]).unwrap(), vec![2.0]);
/// assert_eq!(mode(&[1.0, 1.0, 2.0, 2.0]).unwrap(), vec![1.0, 2.0]);
/// ```
pub fn mode(xs: &[f64]) -> Result<Vec<f64>> {
    non_empty(xs)?;
    let sorted = sorted_copy(xs);

    // Runs of equal values in sorted order are the frequency buckets.
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &v in &sorted {
        match runs.last_mut() {
            Some((value, count)) if *value == v => *count += 1,
            _ => runs.push((v, 1)),
        }
    }

    let best = runs.iter().map(|&(_, c)| c).max().unwrap_or(0);
    Ok(runs
        .into_iter()
        .filter(|&(_, c)| c == best)
        .map(|(v, _)| v)
        .collect())
}

/// Sample variance (Bessel's correction, denominator `n − 1`).
///
/// # Errors
/// - `EmptyInput` for an empty slice.
/// - `InsufficientData` for a single value.
pub fn variance(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    if xs.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            min_required: 2,
            actual: xs.len(),
        });
    }
    Ok(sum_sq_dev(xs) / (xs.len() - 1) as f64)
}

/// Sample standard deviation, `variance(xs).sqrt()`.
pub fn std_dev(xs: &[f64]) -> Result<f64> {
    variance(xs).map(f64::sqrt)
}

/// Smallest value.
pub fn min(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    Ok(xs.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest value.
pub fn max(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    Ok(xs.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// `max − min`.
pub fn range(xs: &[f64]) -> Result<f64> {
    Ok(max(xs)? - min(xs)?)
}

/// Number of values. Never fails.
pub fn count(xs: &[f64]) -> usize {
    xs.len()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// All descriptive statistics of one sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: Vec<f64>,
    /// `None` for a single value.
    pub std_dev: Option<f64>,
    /// `None` for a single value.
    pub variance: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub sum: f64,
}

/// Compute every statistic at once.
pub fn summarize(xs: &[f64]) -> Result<SummaryStats> {
    non_empty(xs)?;
    let variance = match variance(xs) {
        Ok(v) => Some(v),
        Err(AnalyticsError::InsufficientData { .. }) => None,
        Err(e) => return Err(e),
    };
    Ok(SummaryStats {
        count: count(xs),
        mean: mean(xs)?,
        median: median(xs)?,
        mode: mode(xs)?,
        std_dev: variance.map(f64::sqrt),
        variance,
        min: min(xs)?,
        max: max(xs)?,
        range: range(xs)?,
        sum: sum(xs)?,
    })
}

// ---------------------------------------------------------------------------
// Helpers shared with the quantile and aggregation modules
// ---------------------------------------------------------------------------

/// Ascending copy using IEEE total order.
pub(crate) fn sorted_copy(xs: &[f64]) -> Vec<f64> {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median of an already sorted, non-empty slice.
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Σ(x − mean)² for a non-empty slice.
pub(crate) fn sum_sq_dev(xs: &[f64]) -> f64 {
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|v| (v - mean) * (v - mean)).sum()
}
