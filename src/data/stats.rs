use indexmap::IndexMap;
use serde::Serialize;

use super::model::{ColumnData, Table};
use crate::chart::math::value_counts;

// ---------------------------------------------------------------------------
// Per-column descriptive statistics
// ---------------------------------------------------------------------------

/// Summary of a numeric column. `None` stands for an undefined statistic
/// (e.g. the standard deviation of a single value) and serialises as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericStats {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        NumericStats {
            count,
            mean: mean.filter(|v| !v.is_nan()),
            std: std.filter(|v| !v.is_nan()),
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Summary of a non-numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectStats {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

impl ObjectStats {
    pub fn from_column(data: &ColumnData) -> Self {
        let counts = value_counts(data);
        let top = counts.first();
        ObjectStats {
            count: data.len() - data.missing_count(),
            unique: counts.len(),
            top: top.map(|(v, _)| v.to_string()),
            freq: top.map(|(_, n)| *n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnStats {
    Numeric(NumericStats),
    Object(ObjectStats),
}

/// Linear-interpolation quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

// ---------------------------------------------------------------------------
// Dataset statistics
// ---------------------------------------------------------------------------

/// Statistics for a whole table. Maps keep column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub basic_stats: IndexMap<String, ColumnStats>,
    pub missing_values: IndexMap<String, usize>,
    pub data_types: IndexMap<String, &'static str>,
}

impl DatasetStats {
    /// Numeric columns are described numerically; a table without any numeric
    /// column has every column described as objects instead.
    pub fn compute(table: &Table) -> Self {
        let numeric: IndexMap<String, ColumnStats> = table
            .columns()
            .iter()
            .filter_map(|col| {
                let values: Vec<f64> = col.data.numeric()?.into_iter().flatten().collect();
                Some((
                    col.name.clone(),
                    ColumnStats::Numeric(NumericStats::from_values(&values)),
                ))
            })
            .collect();

        let basic_stats = if numeric.is_empty() {
            table
                .columns()
                .iter()
                .map(|col| {
                    (
                        col.name.clone(),
                        ColumnStats::Object(ObjectStats::from_column(&col.data)),
                    )
                })
                .collect()
        } else {
            numeric
        };

        DatasetStats {
            basic_stats,
            missing_values: table
                .columns()
                .iter()
                .map(|c| (c.name.clone(), c.data.missing_count()))
                .collect(),
            data_types: table
                .columns()
                .iter()
                .map(|c| (c.name.clone(), c.data.dtype()))
                .collect(),
        }
    }
}
