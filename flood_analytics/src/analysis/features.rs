//! Rolling and derived features.
//!
//! Records are processed in stored order, which is treated as temporal order.
//! No date continuity check is made: position `i - 1` is "yesterday" even if
//! the `Date` column skips days.
//!
//! A window containing any non-numeric rainfall or water level cell is
//! not-applicable as a whole. It is never re-averaged over the remaining cells.

use crate::analysis::statistics::mean_over;
use crate::model::{COL_RAINFALL, COL_WATER_LEVEL, Dataset, FloodRecord};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

pub const COL_RAINFALL_3DAY_AVG: &str = "Rainfall_3day_avg";
pub const COL_RAINFALL_7DAY_AVG: &str = "Rainfall_7day_avg";
pub const COL_WATER_LEVEL_CHANGE: &str = "WaterLevel_change";
pub const COL_WATER_LEVEL_RISING: &str = "WaterLevel_rising";

/// Derived column names, in the order they are appended to each record.
pub const DERIVED_COLUMNS: [&str; 4] = [
    COL_RAINFALL_3DAY_AVG,
    COL_RAINFALL_7DAY_AVG,
    COL_WATER_LEVEL_CHANGE,
    COL_WATER_LEVEL_RISING,
];

/// The four derived values for one record. `None` means not-applicable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub rainfall_3day_avg: Option<f64>,
    pub rainfall_7day_avg: Option<f64>,
    pub water_level_change: Option<f64>,
    /// 1 when `water_level_change > 0`; 0 otherwise, including when the
    /// change is not-applicable.
    pub water_level_rising: u8,
}

/// A source record with its derived features appended.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord<'a> {
    pub record: &'a FloodRecord,
    pub features: DerivedFeatures,
}

impl Serialize for EngineeredRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.values().len() + DERIVED_COLUMNS.len()))?;
        for (column, value) in self.record.iter() {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry(COL_RAINFALL_3DAY_AVG, &self.features.rainfall_3day_avg)?;
        map.serialize_entry(COL_RAINFALL_7DAY_AVG, &self.features.rainfall_7day_avg)?;
        map.serialize_entry(COL_WATER_LEVEL_CHANGE, &self.features.water_level_change)?;
        map.serialize_entry(COL_WATER_LEVEL_RISING, &self.features.water_level_rising)?;
        map.end()
    }
}

/// Mean of the `window` values ending at position `i`.
///
/// `None` when fewer than `window` positions precede and include `i`, or when
/// any value in the window is absent.
pub fn trailing_mean(series: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    if window == 0 || i >= series.len() || i + 1 < window {
        return None;
    }
    let values: Vec<f64> = series[i + 1 - window..=i].iter().copied().collect::<Option<_>>()?;
    mean_over(&values, window)
}

/// Difference between position `i` and `i - 1`; `None` at `i = 0`, when
/// either value is absent, or when the difference overflows.
pub fn step_change(series: &[Option<f64>], i: usize) -> Option<f64> {
    if i == 0 || i >= series.len() {
        return None;
    }
    Some(series[i]? - series[i - 1]?).filter(|change| change.is_finite())
}

/// Computes derived features for every record, in dataset order.
pub fn engineer_features(dataset: &Dataset) -> Vec<EngineeredRecord<'_>> {
    let rainfall = dataset.numeric_series(COL_RAINFALL);
    let water_level = dataset.numeric_series(COL_WATER_LEVEL);

    dataset
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let water_level_change = step_change(&water_level, i);
            EngineeredRecord {
                record,
                features: DerivedFeatures {
                    rainfall_3day_avg: trailing_mean(&rainfall, i, 3),
                    rainfall_7day_avg: trailing_mean(&rainfall, i, 7),
                    water_level_change,
                    water_level_rising: match water_level_change {
                        Some(change) if change > 0.0 => 1,
                        _ => 0,
                    },
                },
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
