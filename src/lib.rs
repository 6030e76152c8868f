//! Tabular data upload, profiling and chart rendering.
//!
//! A [`Session`] holds the active table. Uploads go through
//! [`data::loader`], columns are classified by [`data::schema`], chart
//! requests are validated by [`chart::build`] and drawn by
//! [`render::render`] into a PNG.

pub mod chart;
pub mod color;
pub mod data;
pub mod error;
pub mod render;
pub mod state;

pub use chart::{ChartKind, ChartRequest, ChartSpec};
pub use data::model::{Column, ColumnData, Table, Value};
pub use error::{ChartError, Error, ErrorCategory, LoadError, RenderError, Result};
pub use render::RenderedImage;
pub use state::{ChartResponse, Dataset, RowsPreview, Session, DEFAULT_ROW_LIMIT};
