//! Per-column descriptive statistics.
//!
//! Conventions:
//! - Standard deviation is the **population** deviation (divide by `count`).
//! - Median is the element at index `count / 2` of the ascending values, with
//!   no averaging for even counts: `[1, 2, 3, 4]` has median 3.
//! - Only `Number` cells participate; `Text` and `Missing` are skipped.

use crate::logging::{self, Component};
use crate::model::{AnalyticsError, Dataset, Value};
use serde::Serialize;

/// Statistic names in display order.
pub const STATISTIC_NAMES: [&str; 6] = ["count", "mean", "std", "min", "median", "max"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl SummaryStatistics {
    /// Looks up a statistic by its [`STATISTIC_NAMES`] name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "count" => Some(self.count as f64),
            "mean" => Some(self.mean),
            "std" => Some(self.std),
            "min" => Some(self.min),
            "median" => Some(self.median),
            "max" => Some(self.max),
            _ => None,
        }
    }
}

/// Largest absolute value in `values`, or 0 for an empty slice.
fn magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m: f64, v| m.max(v.abs()))
}

/// `sum(values) / divisor`, kept finite for finite inputs.
///
/// A plain sum is used when it stays in range. When it overflows, every value
/// is first scaled by the largest magnitude so the sum cannot leave
/// `[-len, len]`. `None` when `divisor` is 0 or the result is still not
/// finite.
pub fn mean_over(values: &[f64], divisor: usize) -> Option<f64> {
    if divisor == 0 {
        return None;
    }
    let n = divisor as f64;
    let plain = values.iter().sum::<f64>() / n;
    if plain.is_finite() {
        return Some(plain);
    }

    let scale = magnitude(values);
    let scaled = values.iter().map(|v| v / scale).sum::<f64>() / n;
    Some(scale * scaled).filter(|m| m.is_finite())
}

/// Population mean and standard deviation, or `None` for an empty slice.
///
/// When every value is identical the deviation is exactly `0.0` and the mean
/// is that value, independent of floating-point summation error. Values near
/// `f64::MAX` are handled by rescaling, and a moment that still cannot be
/// represented yields `None`.
pub fn population_mean_std(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    if values.iter().all(|&v| v == first) {
        return Some((first, 0.0));
    }

    let n = values.len() as f64;
    let mean = mean_over(values, values.len())?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return Some((mean, variance.sqrt()));
    }

    // Population std never exceeds half the range, so the scaled form fits.
    let scale = magnitude(values);
    let scaled_mean = mean / scale;
    let scaled_variance = values
        .iter()
        .map(|v| (v / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;
    let std = scale * scaled_variance.sqrt();
    std.is_finite().then_some((mean, std))
}

/// Summarizes a slice of values; `None` when it is empty.
///
/// Moments are accumulated over the sorted values so the result is bitwise
/// identical for any permutation of the input.
pub fn summarize(values: &[f64]) -> Option<SummaryStatistics> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (mean, std) = population_mean_std(&sorted)?;
    let count = sorted.len();

    Some(SummaryStatistics {
        count,
        mean,
        std,
        min: sorted[0],
        median: sorted[count / 2],
        max: sorted[count - 1],
    })
}

/// Descriptive statistics for one column.
///
/// Returns `Ok(None)` when the column holds no numeric values, and
/// [`AnalyticsError::ColumnNotFound`] when a populated dataset has no such
/// column.
pub fn stats(dataset: &Dataset, column: &str) -> Result<Option<SummaryStatistics>, AnalyticsError> {
    dataset.require_column(column)?;

    let values = dataset.numeric_values(column);
    let summary = summarize(&values);
    if summary.is_none() && !dataset.is_empty() {
        logging::debug(Component::Statistics, Some(column), "no numeric values; statistics not applicable");
    }
    Ok(summary)
}

/// Columns treated as numeric for the statistics table.
///
/// A column qualifies when the first record holds a `Number` in it. Header
/// order is kept and repeated names appear once.
pub fn numeric_columns(dataset: &Dataset) -> Vec<String> {
    let Some(first) = dataset.record(0) else {
        return Vec::new();
    };

    let mut columns: Vec<String> = Vec::new();
    for column in dataset.columns() {
        if columns.contains(column) {
            continue;
        }
        if matches!(first.get(column), Some(Value::Number(_))) {
            columns.push(column.clone());
        }
    }
    columns
}

/// Statistics for every numeric column, in [`numeric_columns`] order.
pub fn stats_by_column(dataset: &Dataset) -> Vec<(String, Option<SummaryStatistics>)> {
    numeric_columns(dataset)
        .into_iter()
        .map(|column| {
            let summary = summarize(&dataset.numeric_values(&column));
            (column, summary)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::delimited::parse_csv;

    fn column_csv(values: &[&str]) -> String {
        let mut csv = String::from("Rainfall_mm,Station\n");
        for v in values {
            csv.push_str(v);
            csv.push_str(",Marikina\n");
        }
        csv
    }

    #[test]
    fn test_median_odd_count() {
        let s = summarize(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn test_median_even_count_uses_index_half_without_averaging() {
        let s = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 3.0, "index floor(4/2)=2 of [1,2,3,4]");
    }

    #[test]
    fn test_population_std_divides_by_count() {
        // Population variance of [2,4,4,4,5,5,7,9] is exactly 4.
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.std, 2.0);
    }

    #[test]
    fn test_std_zero_iff_constant() {
        let constant = summarize(&[0.1, 0.1, 0.1, 0.1, 0.1]).unwrap();
        assert_eq!(constant.std, 0.0);
        assert_eq!(constant.mean, 0.1);

        let varied = summarize(&[0.1, 0.1, 0.2]).unwrap();
        assert!(varied.std > 0.0);
    }

    #[test]
    fn test_min_max_count() {
        let s = summarize(&[3.5, -1.0, 12.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, -1.0);
        assert_eq!(s.max, 12.0);
    }

    #[test]
    fn test_empty_is_not_applicable() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(population_mean_std(&[]), None);
    }

    #[test]
    fn test_stats_skips_text_and_missing() {
        let ds = parse_csv(&column_csv(&["10", "", "heavy", "20"]));
        let s = stats(&ds, "Rainfall_mm").unwrap().unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 15.0);
    }

    #[test]
    fn test_stats_all_non_numeric_is_none() {
        let ds = parse_csv(&column_csv(&["", "n/a"]));
        assert_eq!(stats(&ds, "Rainfall_mm").unwrap(), None);
    }

    #[test]
    fn test_stats_unknown_column_is_caller_error() {
        let ds = parse_csv(&column_csv(&["1"]));
        assert_eq!(
            stats(&ds, "Humidity"),
            Err(AnalyticsError::ColumnNotFound("Humidity".to_string()))
        );
    }

    #[test]
    fn test_stats_on_empty_dataset_is_not_applicable() {
        let ds = parse_csv("");
        assert_eq!(stats(&ds, "Rainfall_mm"), Ok(None));
    }

    #[test]
    fn test_stats_invariant_to_record_order() {
        let forward = parse_csv(&column_csv(&["7", "1", "", "4", "9", "2"]));
        let reversed = parse_csv(&column_csv(&["2", "9", "4", "", "1", "7"]));
        assert_eq!(
            stats(&forward, "Rainfall_mm").unwrap(),
            stats(&reversed, "Rainfall_mm").unwrap()
        );
    }

    #[test]
    fn test_moments_stay_finite_near_f64_max() {
        let ds = parse_csv(&column_csv(&["1e308", "1e308", "1"]));
        let s = stats(&ds, "Rainfall_mm").unwrap().unwrap();
        assert!(s.mean.is_finite(), "mean overflowed: {}", s.mean);
        assert!(s.std.is_finite(), "std overflowed: {}", s.std);
        assert!((s.mean / (1e308 / 3.0 * 2.0) - 1.0).abs() < 1e-12);
        assert!(s.std > 0.0);
    }

    #[test]
    fn test_std_of_opposite_extremes() {
        let (mean, std) = population_mean_std(&[1.7e308, -1.7e308]).unwrap();
        assert_eq!(mean, 0.0);
        assert!((std / 1.7e308 - 1.0).abs() < 1e-12, "std was {}", std);
    }

    #[test]
    fn test_mean_over_custom_divisor() {
        assert_eq!(mean_over(&[1.0, 3.0], 4), Some(1.0));
        assert_eq!(mean_over(&[1.0], 0), None);
        assert_eq!(mean_over(&[f64::MAX, f64::MAX], 2), Some(f64::MAX));
    }

    #[test]
    fn test_numeric_columns_follow_first_record() {
        let ds = parse_csv("Date,Rainfall_mm,Station,WaterLevel_m\n2024-01-01,5,North,\n2024-01-02,6,South,1.2\n");
        assert_eq!(numeric_columns(&ds), vec!["Rainfall_mm".to_string()]);
    }

    #[test]
    fn test_statistic_lookup_by_name() {
        let s = summarize(&[1.0, 2.0, 3.0]).unwrap();
        let looked_up: Vec<Option<f64>> = STATISTIC_NAMES.iter().map(|n| s.get(n)).collect();
        assert_eq!(looked_up, vec![Some(3.0), Some(2.0), Some(s.std), Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(s.get("variance"), None);
    }
}
