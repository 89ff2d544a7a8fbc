//! Tabular analytics over tables of text cells.
//!
//! A [`Table`] is a header plus rows of strings, as handed over by a loader or
//! any storage layer. The engine parses the cells it needs, under an explicit
//! [`ParsePolicy`], and returns typed results or an [`AnalyticsError`].
//!
//! * [`analytics::descriptive`]: mean, median, mode, variance, summary
//! * [`analytics::quantiles`]: quartiles, box plot, z-score and IQR outliers
//! * [`analytics::aggregation`]: group-by reducers and pivot tables
//! * [`analytics::correlation`]: Pearson, Spearman, correlation matrix
//! * [`analytics::distribution`]: histogram and Gaussian KDE
//! * [`data`]: table model, file loading, filter/sort, cleaning
//! * [`chart`]: label/value series for chart front-ends
//! * [`request`] / [`report`]: the JSON request and report of the `tabstat` binary
//!
//! ```
//! use tabstat::analytics::aggregation::{pivot, Aggregation};
//! use tabstat::Table;
//!
//! let t = Table::from_strs(
//!     &["region", "quarter", "sales"],
//!     &[&["North", "Q1", "10"], &["North", "Q1", "30"], &["South", "Q2", "7"]],
//! );
//! let p = pivot(&t, "region", "quarter", "sales", Aggregation::Mean).unwrap();
//! assert_eq!(p.cell("North", "Q1").unwrap(), 20.0);
//! ```

pub mod analytics;
pub mod chart;
pub mod data;
pub mod error;
pub mod report;
pub mod request;

pub use data::model::{ColumnRef, ParsePolicy, Row, Table};
pub use error::{AnalyticsError, ErrorKind, Result};
