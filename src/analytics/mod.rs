/// Numeric core: pure functions over `&[f64]` and [`Table`](crate::data::model::Table).
///
/// ```text
///   Table ──(ParsePolicy)──▶ &[f64]
///     │                        │
///     │                        ├─▶ descriptive   mean, median, mode, variance, …
///     │                        ├─▶ quantiles     quartiles, box plot, outliers
///     │                        └─▶ distribution  histogram, KDE
///     │
///     ├─▶ aggregation   group-by, pivot (strict parse)
///     └─▶ correlation   Pearson / Spearman matrix (strict parse)
/// ```
///
/// Nothing here performs I/O or holds state between calls.

pub mod aggregation;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod quantiles;
