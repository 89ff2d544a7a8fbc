//! Quartiles, box-plot summaries and outlier detection.
//!
//! Quartiles use the **median of halves** convention: sort ascending, split
//! at `n / 2`; for odd `n` the middle element belongs to neither half.
//! Q1 and Q3 are the medians of the lower and upper halves. Linear
//! interpolation conventions give different numbers.

use serde::Serialize;

use crate::analytics::descriptive::{self, median_of_sorted, sorted_copy};
use crate::error::{AnalyticsError, Result};

/// Multiplier applied to the IQR to place the fences.
pub const FENCE_FACTOR: f64 = 1.5;

/// First, second and third quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Box-plot summary derived from [`Quartiles`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxPlot {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    /// `q1 − 1.5·iqr`
    pub lower_fence: f64,
    /// `q3 + 1.5·iqr`
    pub upper_fence: f64,
}

/// Outlier indices plus the fences they were judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqrOutliers {
    /// Positions in the caller's input, ascending.
    pub indices: Vec<usize>,
    pub lower: f64,
    pub upper: f64,
}

/// Quartiles by the halves method.
///
/// # Errors
/// - `EmptyInput` for an empty slice.
/// - `InsufficientData` for a single value (both halves would be empty).
///
/// ```
/// use tabstat::analytics::quantiles::quantiles;
/// let q = quantiles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
/// assert_eq!((q.q1, q.q2, q.q3), (3.0, 5.0, 7.0));
/// ```
pub fn quantiles(xs: &[f64]) -> Result<Quartiles> {
    if xs.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    if xs.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            min_required: 2,
            actual: xs.len(),
        });
    }

    let sorted = sorted_copy(xs);
    let mid = sorted.len() / 2;
    let lower = &sorted[..mid];
    let upper = if sorted.len() % 2 == 0 {
        &sorted[mid..]
    } else {
        &sorted[mid + 1..]
    };

    Ok(Quartiles {
        q1: median_of_sorted(lower),
        q2: median_of_sorted(&sorted),
        q3: median_of_sorted(upper),
    })
}

/// Quartiles, IQR and fences.
pub fn box_plot(xs: &[f64]) -> Result<BoxPlot> {
    let q = quantiles(xs)?;
    let iqr = q.q3 - q.q1;
    Ok(BoxPlot {
        q1: q.q1,
        median: q.q2,
        q3: q.q3,
        iqr,
        lower_fence: q.q1 - FENCE_FACTOR * iqr,
        upper_fence: q.q3 + FENCE_FACTOR * iqr,
    })
}

/// Indices whose absolute z-score exceeds `threshold`.
///
/// The z-score uses the sample standard deviation.
///
/// # Errors
/// - `EmptyInput` / `InsufficientData` from the standard deviation.
/// - `DegenerateDistribution` when every value is identical.
pub fn zscore_outliers(xs: &[f64], threshold: f64) -> Result<Vec<usize>> {
    let mean = descriptive::mean(xs)?;
    let std_dev = descriptive::std_dev(xs)?;
    if std_dev == 0.0 {
        return Err(AnalyticsError::DegenerateDistribution);
    }
    log::debug!("z-score outliers: mean={mean}, std_dev={std_dev}, threshold={threshold}");

    Ok(xs
        .iter()
        .enumerate()
        .filter(|&(_, &v)| ((v - mean) / std_dev).abs() > threshold)
        .map(|(i, _)| i)
        .collect())
}

/// Indices of values strictly outside the box-plot fences.
pub fn iqr_outliers(xs: &[f64]) -> Result<IqrOutliers> {
    let bp = box_plot(xs)?;
    log::debug!(
        "IQR outliers: q1={}, q3={}, iqr={}, fences=[{}, {}]",
        bp.q1,
        bp.q3,
        bp.iqr,
        bp.lower_fence,
        bp.upper_fence
    );

    let indices = xs
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v < bp.lower_fence || v > bp.upper_fence)
        .map(|(i, _)| i)
        .collect();

    Ok(IqrOutliers {
        indices,
        lower: bp.lower_fence,
        upper: bp.upper_fence,
    })
}
