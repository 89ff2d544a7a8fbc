//! The JSON request document read by the `tabstat` binary.
//!
//! ```json
//! {
//!   "analyses": [
//!     { "analysis": "summary", "column": "sales" },
//!     { "analysis": "group_by", "key": "region", "value": "sales", "aggregation": "sum" },
//!     { "analysis": "histogram", "column": "sales", "bins": 8 }
//!   ]
//! }
//! ```
//!
//! Enumerated options (`aggregation`, `method`, filter `op`, sort `order`)
//! are resolved while the document is parsed, so an unknown name rejects the
//! whole request before any analysis runs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analytics::aggregation::Aggregation;
use crate::analytics::correlation::CorrelationMethod;
use crate::data::filter::{FilterOption, SortOption};
use crate::data::model::ColumnRef;

fn default_bins() -> usize {
    10
}

fn default_points() -> usize {
    50
}

fn default_threshold() -> f64 {
    3.0
}

/// One analysis to run against the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum Analysis {
    /// Every descriptive statistic of one column.
    Summary { column: ColumnRef },
    Mode { column: ColumnRef },
    GroupBy {
        key: ColumnRef,
        value: ColumnRef,
        aggregation: Aggregation,
    },
    Pivot {
        row_key: ColumnRef,
        col_key: ColumnRef,
        value: ColumnRef,
        aggregation: Aggregation,
    },
    Correlation {
        columns: Vec<ColumnRef>,
        #[serde(default)]
        method: CorrelationMethod,
    },
    Histogram {
        column: ColumnRef,
        #[serde(default = "default_bins")]
        bins: usize,
    },
    Kde {
        column: ColumnRef,
        #[serde(default = "default_points")]
        points: usize,
        bandwidth: f64,
    },
    BoxPlot { column: ColumnRef },
    ZscoreOutliers {
        column: ColumnRef,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    IqrOutliers { column: ColumnRef },
    FilterSort {
        #[serde(default)]
        filters: Vec<FilterOption>,
        #[serde(default)]
        sort: Option<SortOption>,
    },
}

impl Analysis {
    /// The `analysis` tag this variant is parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            Analysis::Summary { .. } => "summary",
            Analysis::Mode { .. } => "mode",
            Analysis::GroupBy { .. } => "group_by",
            Analysis::Pivot { .. } => "pivot",
            Analysis::Correlation { .. } => "correlation",
            Analysis::Histogram { .. } => "histogram",
            Analysis::Kde { .. } => "kde",
            Analysis::BoxPlot { .. } => "box_plot",
            Analysis::ZscoreOutliers { .. } => "zscore_outliers",
            Analysis::IqrOutliers { .. } => "iqr_outliers",
            Analysis::FilterSort { .. } => "filter_sort",
        }
    }
}

/// An ordered list of analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub analyses: Vec<Analysis>,
}

impl Request {
    pub fn from_json(text: &str) -> Result<Self> {
        let request: Request = serde_json::from_str(text).context("parsing request JSON")?;
        log::debug!("Request with {} analyses", request.analyses.len());
        Ok(request)
    }
}

/// Read and validate a request file.
pub fn load_request(path: &Path) -> Result<Request> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading request file {}", path.display()))?;
    Request::from_json(&text).with_context(|| format!("in {}", path.display()))
}
