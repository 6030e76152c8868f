use indexmap::IndexMap;
use serde::Serialize;

use crate::data::model::{ColumnData, Value};

pub const HISTOGRAM_BINS: usize = 30;
pub const BAR_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Partition the range of `values` into `bins` equal-width bins and count the
/// values in each. Bins are half-open except the last, which is closed.
/// A zero-width range widens to `[v - 0.5, v + 0.5]`. Values must be finite.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    // Scale before subtracting: `hi - lo` overflows for ranges wider than f64::MAX.
    let n = bins as f64;
    let width = hi / n - lo / n;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();
    let mut counts = vec![0usize; bins];

    for &v in values {
        let mut idx = ((v / width - lo / width) as usize).min(bins - 1);
        // Float error can land a value one bin off its edges.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx < bins - 1 && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: edges[i],
            upper: edges[i + 1],
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

/// Frequency of each distinct non-missing value, most frequent first. Equal
/// counts keep the order in which the values first appear.
pub fn value_counts(data: &ColumnData) -> Vec<(Value, usize)> {
    let mut counts: IndexMap<Value, usize> = IndexMap::new();
    for value in data.values().filter(|v| !v.is_null()) {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut counts: Vec<(Value, usize)> = counts.into_iter().collect();
    // stable: ties stay in first-occurrence order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson coefficient over the rows where both series have a value.
/// `None` when fewer than two such rows exist or either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Symmetric pairwise correlation matrix. Diagonal entries are exactly 1.0
/// for columns with non-zero variance.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let n = columns.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        matrix[i][i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[29].upper, 99.0);
        // the maximum lands in the closed last bin
        assert!(bins[29].count >= 1);
    }

    #[test]
    fn histogram_of_a_constant_widens_the_range() {
        let bins = histogram(&[5.0, 5.0], 30);
        assert_relative_eq!(bins[0].lower, 4.5);
        assert_relative_eq!(bins[29].upper, 5.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 30).is_empty());
    }

    #[test]
    fn histogram_spanning_the_whole_float_range() {
        let bins = histogram(&[-1e308, 1e306, 1e308], HISTOGRAM_BINS);
        assert_eq!(bins[0].lower, -1e308);
        assert_eq!(bins[29].upper, 1e308);
        assert!(bins.iter().all(|b| b.lower.is_finite() && b.upper.is_finite()));
        assert!(bins.windows(2).all(|w| w[0].upper == w[1].lower));
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[15].count, 1);
        assert_eq!(bins[29].count, 1);
    }

    #[test]
    fn value_counts_break_ties_by_first_occurrence() {
        let data = ColumnData::Text(
            ["C", "A", "B", "A", "B", "D"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect(),
        );
        let labels: Vec<(String, usize)> = value_counts(&data)
            .into_iter()
            .map(|(v, n)| (v.to_string(), n))
            .collect();
        assert_eq!(
            labels,
            [
                ("A".to_string(), 2),
                ("B".to_string(), 2),
                ("C".to_string(), 1),
                ("D".to_string(), 1)
            ]
        );
    }

    #[test]
    fn pearson_of_linear_series() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0);
        let neg = [Some(3.0), Some(2.0), Some(1.0), Some(0.0)];
        assert_relative_eq!(pearson(&x, &neg).unwrap(), -1.0);
    }

    #[test]
    fn pearson_undefined_cases() {
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
        assert_eq!(pearson(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let cols = vec![
            vec![Some(1.0), Some(2.0), Some(4.0)],
            vec![Some(3.0), Some(1.0), Some(2.0)],
            vec![Some(7.0), Some(7.0), Some(7.0)],
        ];
        let m = correlation_matrix(&cols);
        assert_eq!(m[0][0], Some(1.0));
        assert_eq!(m[1][1], Some(1.0));
        assert_eq!(m[2][2], None);
        assert_eq!(m[0][1], m[1][0]);
        assert_eq!(m[0][2], None);
    }
}
