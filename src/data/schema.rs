use log::debug;
use serde::Serialize;

use super::model::{ColumnData, Table};

// ---------------------------------------------------------------------------
// Column classification
// ---------------------------------------------------------------------------

/// How a column may be used by the chart builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-missing value is an integer or a float.
    Numeric,
    /// Text, boolean or mixed (object) values.
    Categorical,
    /// Neither, e.g. datetimes.
    Other,
}

impl ColumnKind {
    pub fn of(data: &ColumnData) -> Self {
        match data {
            ColumnData::Int(_) | ColumnData::Float(_) => ColumnKind::Numeric,
            ColumnData::Text(_) | ColumnData::Bool(_) | ColumnData::Mixed(_) => {
                ColumnKind::Categorical
            }
            ColumnData::DateTime(_) => ColumnKind::Other,
        }
    }
}

/// Per-column metadata derived from a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: &'static str,
    pub missing: usize,
}

/// Profile every column of `table`, in column order. Never mutates the table.
pub fn classify(table: &Table) -> Vec<ColumnProfile> {
    let profiles: Vec<ColumnProfile> = table
        .columns()
        .iter()
        .map(|col| ColumnProfile {
            name: col.name.clone(),
            kind: ColumnKind::of(&col.data),
            dtype: col.data.dtype(),
            missing: col.data.missing_count(),
        })
        .collect();
    debug!(
        "classified {} columns ({} numeric)",
        profiles.len(),
        profiles.iter().filter(|p| p.kind == ColumnKind::Numeric).count()
    );
    profiles
}

/// Names of the profiles of the given kind, in column order.
pub fn names_of_kind(profiles: &[ColumnProfile], kind: ColumnKind) -> Vec<String> {
    profiles
        .iter()
        .filter(|p| p.kind == kind)
        .map(|p| p.name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Schema summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: &'static str,
}

/// Shape and column typing of a table, for client display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSummary>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl SchemaSummary {
    pub fn new(table: &Table, profiles: &[ColumnProfile]) -> Self {
        SchemaSummary {
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns: profiles
                .iter()
                .map(|p| ColumnSummary {
                    name: p.name.clone(),
                    dtype: p.dtype,
                })
                .collect(),
            numeric_columns: names_of_kind(profiles, ColumnKind::Numeric),
            categorical_columns: names_of_kind(profiles, ColumnKind::Categorical),
        }
    }
}
