/// Data layer: core types, loading, classification and statistics.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls / .json bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named, equal-length typed columns
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  schema   │   │  stats    │  describe(), missing counts, dtypes
///   └──────────┘   └──────────┘
///   Numeric / Categorical / Other
/// ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
