//! Histogram binning and Gaussian kernel density estimation.
//!
//! Results are purely numeric; chart labels are rendered by [`crate::chart`].

use std::f64::consts::PI;

use serde::Serialize;

use crate::analytics::descriptive::sorted_copy;
use crate::error::{AnalyticsError, Result};

/// Equal-width bins: `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Total number of binned values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Density estimates at evenly spaced evaluation points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kde {
    pub points: Vec<f64>,
    pub densities: Vec<f64>,
}

/// Bin `xs` into `num_bins` equal-width bins spanning `[min, max]`.
///
/// When every value is identical the range is widened to `[v − 0.5, v + 0.5]`.
/// The maximum value lands in the last bin.
///
/// ```
/// use tabstat::analytics::distribution::histogram;
/// let h = histogram(&[1.0, 2.0, 2.0, 3.0, 4.0], 3).unwrap();
/// assert_eq!(h.counts, vec![1, 2, 2]);
/// ```
pub fn histogram(xs: &[f64], num_bins: usize) -> Result<Histogram> {
    if xs.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    if num_bins == 0 {
        return Err(AnalyticsError::InvalidArgument {
            name: "num_bins",
            reason: "must be greater than 0".to_string(),
        });
    }

    let mut min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        log::debug!("histogram: constant input {min}, widening range by 0.5 on each side");
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / num_bins as f64;
    let edges = (0..=num_bins).map(|i| min + i as f64 * width).collect();

    let mut counts = vec![0usize; num_bins];
    for &v in xs {
        // `as usize` saturates negatives and NaN to 0.
        let idx = (((v - min) / width).floor() as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Gaussian KDE evaluated at `num_points` evenly spaced points in `[min, max]`.
///
/// ```text
/// f(x) = 1 / (n·h·√(2π)) · Σ exp(−½·((x − xᵢ)/h)²)
/// ```
///
/// A single evaluation point is placed at the minimum.
///
/// # Errors
/// - `EmptyInput` for an empty slice.
/// - `InvalidArgument` when `num_points` is 0 or `bandwidth` is not positive.
pub fn kde(xs: &[f64], num_points: usize, bandwidth: f64) -> Result<Kde> {
    if xs.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    if num_points == 0 {
        return Err(AnalyticsError::InvalidArgument {
            name: "num_points",
            reason: "must be greater than 0".to_string(),
        });
    }
    if bandwidth.is_nan() || bandwidth <= 0.0 {
        return Err(AnalyticsError::InvalidArgument {
            name: "bandwidth",
            reason: format!("must be positive, got {bandwidth}"),
        });
    }

    let sorted = sorted_copy(xs);
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let step = if num_points > 1 {
        (max - min) / (num_points - 1) as f64
    } else {
        0.0
    };

    let norm = 1.0 / (sorted.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    let points: Vec<f64> = (0..num_points).map(|i| min + i as f64 * step).collect();
    let densities = points
        .iter()
        .map(|&x| {
            let s: f64 = sorted
                .iter()
                .map(|&xi| {
                    let u = (x - xi) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            norm * s
        })
        .collect();

    Ok(Kde { points, densities })
}
