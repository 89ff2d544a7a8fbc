use serde::Serialize;

use crate::analytics::distribution::{Histogram, Kde};
use crate::analytics::quantiles::BoxPlot;

// ---------------------------------------------------------------------------
// Chart series: labels + values in the shape chart front-ends consume
// ---------------------------------------------------------------------------

/// Parallel `labels` / `values` arrays for one chart dataset.
///
/// Label strings are a compatibility contract with chart consumers and use
/// two-decimal fixed point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
}

/// One `[lo, hi]` label per bin, values are the bin counts.
pub fn histogram_chart(hist: &Histogram) -> ChartSeries<usize> {
    let labels = hist
        .edges
        .windows(2)
        .map(|w| format!("[{:.2}, {:.2}]", w[0], w[1]))
        .collect();
    ChartSeries {
        labels,
        values: hist.counts.clone(),
    }
}

/// One label per evaluation point, values are the densities.
pub fn kde_chart(kde: &Kde) -> ChartSeries<f64> {
    ChartSeries {
        labels: kde.points.iter().map(|x| format!("{x:.2}")).collect(),
        values: kde.densities.clone(),
    }
}

pub const BOX_PLOT_LABELS: [&str; 4] = ["Q1", "Q3", "Lower Outlier", "Upper Outlier"];

/// Quartiles and fences as four labelled values.
pub fn box_plot_chart(bp: &BoxPlot) -> ChartSeries<f64> {
    ChartSeries {
        labels: BOX_PLOT_LABELS.iter().map(|s| s.to_string()).collect(),
        values: vec![bp.q1, bp.q3, bp.lower_fence, bp.upper_fence],
    }
}
