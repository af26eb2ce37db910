//! Dataset-wide flood risk insights.
//!
//! # Mean water level convention
//! The mean water level divides the sum of present `WaterLevel_m` values by
//! the **total record count**, not by the number of records that report a
//! water level. Datasets with gaps therefore get a lower mean than a
//! present-only average would give. This matches the figures the dashboard
//! has always shown; it is `None` when there are no records or no water
//! level values at all.

use crate::analysis::statistics::mean_over;
use crate::model::{COL_RAINFALL, COL_WATER_LEVEL, Dataset};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsSummary {
    pub total_records: usize,
    pub mean_rainfall_mm: Option<f64>,
    pub max_rainfall_mm: Option<f64>,
    pub min_rainfall_mm: Option<f64>,
    /// Records with `FloodOccurrence` exactly 1.
    pub flood_occurrences: usize,
    pub normal_count: usize,
    /// `100 × flood_occurrences / total_records`; `None` for an empty dataset.
    pub flood_rate_pct: Option<f64>,
    /// See the module docs for the divisor.
    pub mean_water_level_m: Option<f64>,
}

/// Computes the insights summary over every record.
pub fn insights(dataset: &Dataset) -> InsightsSummary {
    let total_records = dataset.len();
    let rainfall = dataset.numeric_values(COL_RAINFALL);
    let water_levels = dataset.numeric_values(COL_WATER_LEVEL);
    let flood_occurrences = dataset.records().iter().filter(|r| r.is_flooded()).count();

    let mean_rainfall_mm = mean_over(&rainfall, rainfall.len());

    let flood_rate_pct = if total_records == 0 {
        None
    } else {
        Some(100.0 * flood_occurrences as f64 / total_records as f64)
    };

    let mean_water_level_m = if water_levels.is_empty() {
        None
    } else {
        mean_over(&water_levels, total_records)
    };

    InsightsSummary {
        total_records,
        mean_rainfall_mm,
        max_rainfall_mm: rainfall.iter().copied().reduce(f64::max),
        min_rainfall_mm: rainfall.iter().copied().reduce(f64::min),
        flood_occurrences,
        normal_count: total_records - flood_occurrences,
        flood_rate_pct,
        mean_water_level_m,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
