use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Component errors
// ---------------------------------------------------------------------------

/// Failure to turn an input byte stream into a [`Table`](crate::data::model::Table).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file format: '{extension}' (expected csv, xlsx, xls or json)")]
    UnsupportedFormat { extension: String },

    #[error("failed to parse CSV: {reason}")]
    Csv { reason: String },

    #[error("failed to read spreadsheet: {reason}")]
    Excel { reason: String },

    #[error("failed to parse JSON: {reason}")]
    Json { reason: String },

    /// The input parsed but does not describe a table.
    #[error("input is not a table: {reason}")]
    InvalidStructure { reason: String },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A chart request that cannot be satisfied by the active table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("unknown chart kind: '{0}' (expected histogram, scatter, bar or correlation)")]
    UnknownChartKind(String),

    #[error("{kind} chart requires a {role} column")]
    ColumnNotSpecified { kind: String, role: &'static str },

    #[error("column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("column '{0}' is not numeric")]
    ColumnNotNumeric(String),

    #[error("insufficient numeric columns: correlation requires at least 2, found {found}")]
    InsufficientNumericColumns { found: usize },

    #[error("column '{0}' contains infinite values and cannot be binned")]
    NonFiniteRange(String),
}

/// A fault raised while drawing or encoding a chart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("image encoding failed: {0}")]
    Encoding(String),

    #[error("drawing library panicked: {0}")]
    Panicked(String),
}

// ---------------------------------------------------------------------------
// Crate-level error
// ---------------------------------------------------------------------------

/// Coarse failure category exposed to callers that need to tell failures apart
/// without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Load,
    Chart,
    Render,
    State,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no data loaded")]
    NoDataLoaded,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Load(_) => ErrorCategory::Load,
            Error::Chart(_) => ErrorCategory::Chart,
            Error::Render(_) => ErrorCategory::Render,
            Error::NoDataLoaded => ErrorCategory::State,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
