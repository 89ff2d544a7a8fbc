//! Runs a [`Request`] against a [`Table`] and collects one JSON entry per analysis.
//!
//! A failing analysis produces an `error` entry and the run continues.
//! Descriptive, distribution and outlier analyses read their column with
//! [`ParsePolicy::Skip`]; group-by, pivot and correlation parse strictly.

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::analytics::aggregation::{group_by, grouped_count, pivot, Aggregation};
use crate::analytics::{correlation, descriptive, distribution, quantiles};
use crate::chart;
use crate::data::model::{ColumnRef, ParsePolicy, Table};
use crate::request::{Analysis, Request};

/// Outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(JsonValue),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub analysis: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ReportEntry {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Result(_))
    }
}

/// Everything the `tabstat` binary prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    pub columns: Vec<String>,
    pub entries: Vec<ReportEntry>,
}

/// Run every analysis of `request` in order.
pub fn run(table: &Table, request: &Request) -> Report {
    let entries = request
        .analyses
        .iter()
        .map(|analysis| {
            let name = analysis.name();
            let outcome = match execute(table, analysis) {
                Ok(value) => {
                    log::debug!("{name}: ok");
                    Outcome::Result(value)
                }
                Err(e) => {
                    log::warn!("{name} failed: {e:#}");
                    Outcome::Error(format!("{e:#}"))
                }
            };
            ReportEntry {
                analysis: name,
                outcome,
            }
        })
        .collect::<Vec<_>>();

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    log::info!(
        "Ran {} analyses over {} rows ({failed} failed)",
        entries.len(),
        table.len()
    );

    Report {
        rows: table.len(),
        columns: table.header.clone(),
        entries,
    }
}

fn lenient(table: &Table, column: &ColumnRef) -> Result<Vec<f64>> {
    Ok(table.numeric_column(column, ParsePolicy::Skip)?)
}

/// Run a single analysis and render its result as JSON.
pub fn execute(table: &Table, analysis: &Analysis) -> Result<JsonValue> {
    let value = match analysis {
        Analysis::Summary { column } => {
            serde_json::to_value(descriptive::summarize(&lenient(table, column)?)?)?
        }
        Analysis::Mode { column } => json!(descriptive::mode(&lenient(table, column)?)?),
        Analysis::GroupBy {
            key,
            value,
            aggregation,
        } => {
            let groups = group_by(table, key, value)?;
            match aggregation {
                Aggregation::Count => json!(grouped_count(&groups)),
                agg => json!(agg.reduce_groups(&groups)),
            }
        }
        Analysis::Pivot {
            row_key,
            col_key,
            value,
            aggregation,
        } => json!(pivot(table, row_key, col_key, value, *aggregation)?),
        Analysis::Correlation { columns, method } => {
            json!(correlation::correlation_matrix(table, columns, *method)?)
        }
        Analysis::Histogram { column, bins } => {
            let hist = distribution::histogram(&lenient(table, column)?, *bins)?;
            json!({ "histogram": hist, "chart": chart::histogram_chart(&hist) })
        }
        Analysis::Kde {
            column,
            points,
            bandwidth,
        } => {
            let kde = distribution::kde(&lenient(table, column)?, *points, *bandwidth)?;
            json!({ "kde": kde, "chart": chart::kde_chart(&kde) })
        }
        Analysis::BoxPlot { column } => {
            let bp = quantiles::box_plot(&lenient(table, column)?)?;
            json!({ "box_plot": bp, "chart": chart::box_plot_chart(&bp) })
        }
        Analysis::ZscoreOutliers { column, threshold } => {
            let indices = quantiles::zscore_outliers(&lenient(table, column)?, *threshold)?;
            json!({ "indices": indices, "threshold": threshold })
        }
        Analysis::IqrOutliers { column } => json!(quantiles::iqr_outliers(&lenient(table, column)?)?),
        Analysis::FilterSort { filters, sort } => json!(table.filter_sort(filters, sort.as_ref())?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_strs(
            &["region", "sales"],
            &[&["North", "10"], &["North", "20"], &["South", "5"], &["South", "n/a"]],
        )
    }

    #[test]
    fn entries_follow_request_order_and_survive_failures() {
        let request = Request {
            analyses: vec![
                Analysis::Mode { column: "sales".into() },
                Analysis::GroupBy {
                    key: "region".into(),
                    value: "sales".into(),
                    aggregation: Aggregation::Sum,
                },
                Analysis::Summary { column: "missing".into() },
            ],
        };
        let report = run(&table(), &request);
        assert_eq!(report.rows, 4);
        assert_eq!(report.entries.len(), 3);

        assert_eq!(report.entries[0].outcome, Outcome::Result(json!([5.0, 10.0, 20.0])));
        // Strict group-by trips over "n/a" in row 3.
        match &report.entries[1].outcome {
            Outcome::Error(msg) => assert!(msg.contains("row 3"), "{msg}"),
            other => panic!("expected error, got {other:?}"),
        }
        match &report.entries[2].outcome {
            Outcome::Error(msg) => assert!(msg.contains("'missing' not found"), "{msg}"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn entry_json_shape() {
        let entry = ReportEntry {
            analysis: "mode",
            outcome: Outcome::Result(json!([1.0])),
        };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"analysis": "mode", "result": [1.0]}));
        let entry = ReportEntry {
            analysis: "kde",
            outcome: Outcome::Error("input is empty".into()),
        };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"analysis": "kde", "error": "input is empty"}));
    }

    #[test]
    fn count_aggregation_reports_integers() {
        let t = Table::from_strs(&["k", "v"], &[&["a", "1"], &["a", "2"], &["b", "3"]]);
        let value = execute(
            &t,
            &Analysis::GroupBy {
                key: "k".into(),
                value: "v".into(),
                aggregation: Aggregation::Count,
            },
        )
        .unwrap();
        assert_eq!(value, json!({"a": 2, "b": 1}));
    }

    #[test]
    fn histogram_carries_chart_labels() {
        let value = execute(&table(), &Analysis::Histogram { column: "sales".into(), bins: 3 }).unwrap();
        assert_eq!(value["histogram"]["counts"], json!([1, 1, 1]));
        assert_eq!(value["chart"]["labels"][0], "[5.00, 10.00]");
    }
}
