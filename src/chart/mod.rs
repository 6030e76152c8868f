/// Chart layer: request parsing, validation and derived series.
///
/// ```text
///   ChartRequest ──► dispatch::build ──► ChartSpec ──► render
///                        │
///                        ▼
///                      math   (bins, value counts, Pearson)
/// ```

pub mod dispatch;
pub mod math;
pub mod request;

pub use dispatch::{build, ChartData, ChartSpec};
pub use request::{ChartKind, ChartRequest};
