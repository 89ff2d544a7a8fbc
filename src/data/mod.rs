/// Data layer: core types, loading, filtering and clean-up.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (text cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Table, ColumnRef, ParsePolicy → numeric columns
///   └──────────┘
///        │
///        ├─▶ filter    predicates + stable sort → rows
///        └─▶ cleaning  missing values, transforms, column ops → Table
/// ```

pub mod cleaning;
pub mod filter;
pub mod loader;
pub mod model;
