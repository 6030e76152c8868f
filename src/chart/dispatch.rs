use log::debug;
use serde::Serialize;

use super::math::{self, HistogramBin, BAR_TOP_N, HISTOGRAM_BINS};
use super::request::{ChartKind, ChartRequest};
use crate::data::model::{Column, Table};
use crate::data::schema::{ColumnKind, ColumnProfile};
use crate::error::ChartError;

// ---------------------------------------------------------------------------
// ChartSpec – validated, ready-to-render chart
// ---------------------------------------------------------------------------

/// Derived series for each chart kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartData {
    Histogram {
        bins: Vec<HistogramBin>,
    },
    Scatter {
        points: Vec<(f64, f64)>,
    },
    Bar {
        /// `(label, count)`, most frequent first.
        categories: Vec<(String, usize)>,
    },
    Correlation {
        columns: Vec<String>,
        /// Row-major, `None` where the coefficient is undefined.
        matrix: Vec<Vec<Option<f64>>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate `request` against the classified table and compute the chart's
/// derived data. The first violated constraint is returned as the error.
pub fn build(
    request: &ChartRequest,
    table: &Table,
    profiles: &[ColumnProfile],
) -> Result<ChartSpec, ChartError> {
    let columns = Columns { table, profiles };

    let spec = match request.kind {
        ChartKind::Histogram => {
            let (name, values) = columns.numeric(request, Role::Primary)?;
            let values: Vec<f64> = values.into_iter().flatten().collect();
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ChartError::NonFiniteRange(name));
            }
            ChartSpec {
                kind: ChartKind::Histogram,
                title: format!("Histogram of {name}"),
                x_label: name,
                y_label: "Frequency".to_string(),
                data: ChartData::Histogram {
                    bins: math::histogram(&values, HISTOGRAM_BINS),
                },
            }
        }
        ChartKind::Scatter => {
            let (x_name, xs) = columns.numeric(request, Role::Primary)?;
            let (y_name, ys) = columns.numeric(request, Role::Secondary)?;
            let points = xs
                .into_iter()
                .zip(ys)
                .filter_map(|(x, y)| Some((x?, y?)))
                .collect();
            ChartSpec {
                kind: ChartKind::Scatter,
                title: format!("{x_name} vs {y_name}"),
                x_label: x_name,
                y_label: y_name,
                data: ChartData::Scatter { points },
            }
        }
        ChartKind::Bar => {
            let (column, _) = columns.resolve(request, Role::Primary)?;
            let categories = math::value_counts(&column.data)
                .into_iter()
                .take(BAR_TOP_N)
                .map(|(value, count)| (value.to_string(), count))
                .collect();
            ChartSpec {
                kind: ChartKind::Bar,
                title: format!("Top 10 Values - {}", column.name),
                x_label: column.name.clone(),
                y_label: "Count".to_string(),
                data: ChartData::Bar { categories },
            }
        }
        ChartKind::Correlation => {
            let numeric: Vec<&ColumnProfile> = profiles
                .iter()
                .filter(|p| p.kind == ColumnKind::Numeric)
                .collect();
            if numeric.len() < 2 {
                return Err(ChartError::InsufficientNumericColumns {
                    found: numeric.len(),
                });
            }
            let mut names = Vec::with_capacity(numeric.len());
            let mut series = Vec::with_capacity(numeric.len());
            for profile in numeric {
                let values = table
                    .column(&profile.name)
                    .and_then(|c| c.data.numeric())
                    .ok_or_else(|| ChartError::ColumnNotNumeric(profile.name.clone()))?;
                names.push(profile.name.clone());
                series.push(values);
            }
            ChartSpec {
                kind: ChartKind::Correlation,
                title: "Correlation Heatmap".to_string(),
                x_label: String::new(),
                y_label: String::new(),
                data: ChartData::Correlation {
                    matrix: math::correlation_matrix(&series),
                    columns: names,
                },
            }
        }
    };

    debug!("built {} chart '{}'", spec.kind, spec.title);
    Ok(spec)
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Primary,
    Secondary,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }

    fn reference(self, request: &ChartRequest) -> Option<&str> {
        match self {
            Role::Primary => request.primary.as_deref(),
            Role::Secondary => request.secondary.as_deref(),
        }
    }
}

/// Column lookup against a table and its profiles.
struct Columns<'a> {
    table: &'a Table,
    profiles: &'a [ColumnProfile],
}

impl<'a> Columns<'a> {
    /// The referenced column and its classified kind.
    fn resolve(
        &self,
        request: &ChartRequest,
        role: Role,
    ) -> Result<(&'a Column, ColumnKind), ChartError> {
        let name = role
            .reference(request)
            .ok_or_else(|| ChartError::ColumnNotSpecified {
                kind: request.kind.to_string(),
                role: role.name(),
            })?;
        let column = self
            .table
            .column(name)
            .ok_or_else(|| ChartError::ColumnNotFound(name.to_string()))?;
        let kind = self
            .profiles
            .iter()
            .find(|p| p.name == name)
            .map_or_else(|| ColumnKind::of(&column.data), |p| p.kind);
        Ok((column, kind))
    }

    /// The referenced column's values, which must be numeric.
    fn numeric(
        &self,
        request: &ChartRequest,
        role: Role,
    ) -> Result<(String, Vec<Option<f64>>), ChartError> {
        let (column, kind) = self.resolve(request, role)?;
        match (kind, column.data.numeric()) {
            (ColumnKind::Numeric, Some(values)) => Ok((column.name.clone(), values)),
            _ => Err(ChartError::ColumnNotNumeric(column.name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnData;
    use crate::data::schema::classify;

    fn people() -> Table {
        Table::new(vec![
            Column::new("age", ColumnData::Float(vec![Some(25.0), Some(30.0), None, Some(40.0)])),
            Column::new(
                "city",
                ColumnData::Text(["A", "B", "A", "C"].iter().map(|s| Some(s.to_string())).collect()),
            ),
        ])
        .unwrap()
    }

    fn build_for(request: ChartRequest, table: &Table) -> Result<ChartSpec, ChartError> {
        build(&request, table, &classify(table))
    }

    #[test]
    fn histogram_drops_missing_values() {
        let spec = build_for(ChartRequest::new(ChartKind::Histogram).with_primary("age"), &people())
            .unwrap();
        assert_eq!(spec.title, "Histogram of age");
        let ChartData::Histogram { bins } = spec.data else {
            panic!("expected histogram data");
        };
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_requires_numeric_primary() {
        let t = people();
        assert_eq!(
            build_for(ChartRequest::new(ChartKind::Histogram).with_primary("city"), &t),
            Err(ChartError::ColumnNotNumeric("city".into()))
        );
        assert_eq!(
            build_for(ChartRequest::new(ChartKind::Histogram), &t),
            Err(ChartError::ColumnNotSpecified {
                kind: "histogram".into(),
                role: "primary"
            })
        );
    }

    #[test]
    fn bar_counts_in_first_occurrence_order() {
        let spec =
            build_for(ChartRequest::new(ChartKind::Bar).with_primary("city"), &people()).unwrap();
        assert_eq!(
            spec.data,
            ChartData::Bar {
                categories: vec![("A".into(), 2), ("B".into(), 1), ("C".into(), 1)]
            }
        );
    }

    #[test]
    fn scatter_reports_the_missing_column_by_name() {
        let err = build_for(
            ChartRequest::new(ChartKind::Scatter)
                .with_primary("age")
                .with_secondary("weight"),
            &people(),
        )
        .unwrap_err();
        assert_eq!(err, ChartError::ColumnNotFound("weight".into()));
    }

    #[test]
    fn correlation_needs_two_numeric_columns() {
        assert_eq!(
            build_for(ChartRequest::new(ChartKind::Correlation), &people()),
            Err(ChartError::InsufficientNumericColumns { found: 1 })
        );
    }

    #[test]
    fn infinite_values_cannot_be_binned() {
        let t = Table::new(vec![Column::new(
            "x",
            ColumnData::Float(vec![Some(1.0), Some(f64::INFINITY)]),
        )])
        .unwrap();
        assert_eq!(
            build_for(ChartRequest::new(ChartKind::Histogram).with_primary("x"), &t),
            Err(ChartError::NonFiniteRange("x".into()))
        );
    }
}
