use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::chart::{self, ChartRequest};
use crate::data::loader;
use crate::data::model::Table;
use crate::data::schema::{classify, ColumnProfile, SchemaSummary};
use crate::data::stats::DatasetStats;
use crate::error::{Error, ErrorCategory, Result};
use crate::render::{self, RenderedImage};

/// Rows returned by [`Session::rows`] when no limit is given.
pub const DEFAULT_ROW_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// A loaded table together with its classification, computed once on load.
#[derive(Debug)]
pub struct Dataset {
    pub table: Table,
    pub profiles: Vec<ColumnProfile>,
}

impl Dataset {
    pub fn new(table: Table) -> Self {
        let profiles = classify(&table);
        Self { table, profiles }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// First rows of the active table plus the true row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsPreview {
    pub rows: Vec<Map<String, JsonValue>>,
    pub total_rows: usize,
}

/// Outcome of a chart request in transport-ready form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartResponse {
    Image { image: String },
    Error { error: String, category: ErrorCategory },
}

impl From<Result<RenderedImage>> for ChartResponse {
    fn from(result: Result<RenderedImage>) -> Self {
        match result {
            Ok(image) => ChartResponse::Image {
                image: image.to_base64(),
            },
            Err(err) => ChartResponse::Error {
                error: err.to_string(),
                category: err.category(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Owns the single active dataset. Loading replaces it wholesale; readers
/// take a snapshot first and never observe a half-swapped state.
#[derive(Debug, Default)]
pub struct Session {
    dataset: RwLock<Option<Arc<Dataset>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `bytes` as a table in the given format and make it the active
    /// dataset. On failure the previous dataset stays active.
    pub fn load(&self, bytes: &[u8], extension: &str) -> Result<SchemaSummary> {
        let table = loader::load(bytes, extension).map_err(|e| {
            warn!("Upload rejected: {e}");
            e
        })?;
        let dataset = Arc::new(Dataset::new(table));
        let summary = SchemaSummary::new(&dataset.table, &dataset.profiles);

        let previous = self.dataset.write().replace(dataset);
        info!(
            "Active dataset replaced ({} rows x {} columns, previous: {})",
            summary.row_count,
            summary.column_count,
            if previous.is_some() { "dropped" } else { "none" }
        );
        Ok(summary)
    }

    /// Stable reference to the active dataset.
    pub fn snapshot(&self) -> Result<Arc<Dataset>> {
        self.dataset.read().clone().ok_or(Error::NoDataLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.read().is_some()
    }

    pub fn schema(&self) -> Result<SchemaSummary> {
        let dataset = self.snapshot()?;
        Ok(SchemaSummary::new(&dataset.table, &dataset.profiles))
    }

    pub fn stats(&self) -> Result<DatasetStats> {
        let dataset = self.snapshot()?;
        Ok(DatasetStats::compute(&dataset.table))
    }

    pub fn rows(&self, limit: usize) -> Result<RowsPreview> {
        let dataset = self.snapshot()?;
        Ok(RowsPreview {
            rows: dataset.table.head_records(limit),
            total_rows: dataset.table.row_count(),
        })
    }

    /// Validate, build and render a chart against the active dataset.
    pub fn render_chart(
        &self,
        kind: &str,
        primary: Option<&str>,
        secondary: Option<&str>,
    ) -> Result<RenderedImage> {
        let request = ChartRequest::parse(kind, primary, secondary)?;
        let dataset = self.snapshot()?;
        let spec = chart::build(&request, &dataset.table, &dataset.profiles)?;
        Ok(render::render(&spec)?)
    }

    /// Like [`Session::render_chart`], folded into `{ image } | { error }`.
    pub fn chart(&self, kind: &str, primary: Option<&str>, secondary: Option<&str>) -> ChartResponse {
        let result = self.render_chart(kind, primary, secondary);
        if let Err(err) = &result {
            warn!("Chart request failed: {err}");
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;

    const CSV: &[u8] = b"age,city\n25,A\n30,B\n,A\n40,C\n";

    #[test]
    fn reads_before_load_fail() {
        let session = Session::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.schema(), Err(Error::NoDataLoaded)));
        assert!(matches!(session.rows(10), Err(Error::NoDataLoaded)));
        assert_eq!(
            session.chart("histogram", Some("age"), None),
            ChartResponse::Error {
                error: "no data loaded".to_string(),
                category: ErrorCategory::State,
            }
        );
    }

    #[test]
    fn load_returns_schema() {
        let session = Session::new();
        let summary = session.load(CSV, "csv").unwrap();
        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.numeric_columns, vec!["age"]);
        assert_eq!(summary.categorical_columns, vec!["city"]);
        assert_eq!(session.schema().unwrap(), summary);
    }

    #[test]
    fn unknown_kind_is_reported_before_data_lookup() {
        let session = Session::new();
        let err = session.render_chart("pie", None, None).unwrap_err();
        assert!(matches!(err, Error::Chart(ChartError::UnknownChartKind(_))));
    }

    #[test]
    fn rows_respect_the_limit() {
        let session = Session::new();
        session.load(CSV, "csv").unwrap();
        let preview = session.rows(2).unwrap();
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 4);
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["totalRows"], 4);
    }

    #[test]
    fn snapshot_survives_replacement() {
        let session = Session::new();
        session.load(CSV, "csv").unwrap();
        let before = session.snapshot().unwrap();
        session.load(b"x\n1\n", "csv").unwrap();
        assert_eq!(before.table.row_count(), 4);
        assert_eq!(session.snapshot().unwrap().table.row_count(), 1);
    }
}
