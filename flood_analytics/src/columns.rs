//! Known column registry.
//!
//! Defines the semantic columns the pipeline understands, with units and
//! expected content. This is the single source of truth for what each known
//! column means; datasets may carry any number of other columns, which are
//! passed through untouched.

use crate::model::{
    COL_DATE, COL_FLOOD_OCCURRENCE, COL_LATITUDE, COL_LONGITUDE, COL_RAINFALL, COL_WATER_LEVEL,
};

/// Metadata for one known column.
#[derive(Debug)]
pub struct KnownColumn {
    /// Header name, matched exactly (case-sensitive).
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub description: &'static str,
    /// Whether cells are expected to parse as numbers.
    pub numeric: bool,
    /// Whether every dataset is expected to carry this column.
    pub required: bool,
}

/// All known columns, in the order they are usually laid out in uploads.
pub static COLUMN_REGISTRY: &[KnownColumn] = &[
    KnownColumn {
        name: COL_DATE,
        unit: None,
        description: "Observation date. Optional; row order is used as time order either way.",
        numeric: false,
        required: false,
    },
    KnownColumn {
        name: COL_RAINFALL,
        unit: Some("mm"),
        description: "Rainfall over the observation period. Drives anomaly \
                      detection and the rolling averages.",
        numeric: true,
        required: true,
    },
    KnownColumn {
        name: COL_WATER_LEVEL,
        unit: Some("m"),
        description: "Water level at the sensor. Used for day-over-day change \
                      and the rising flag.",
        numeric: true,
        required: false,
    },
    KnownColumn {
        name: COL_FLOOD_OCCURRENCE,
        unit: None,
        description: "1 if a flood was recorded, 0 otherwise.",
        numeric: true,
        required: false,
    },
    KnownColumn {
        name: COL_LATITUDE,
        unit: Some("deg"),
        description: "WGS84 latitude of the sensor.",
        numeric: true,
        required: false,
    },
    KnownColumn {
        name: COL_LONGITUDE,
        unit: Some("deg"),
        description: "WGS84 longitude of the sensor.",
        numeric: true,
        required: false,
    },
];

/// Returns the names of columns every dataset is expected to carry.
pub fn required_columns() -> Vec<&'static str> {
    COLUMN_REGISTRY
        .iter()
        .filter(|c| c.required)
        .map(|c| c.name)
        .collect()
}

/// Looks up a column's metadata by header name.
pub fn find_column(name: &str) -> Option<&'static KnownColumn> {
    COLUMN_REGISTRY.iter().find(|c| c.name == name)
}

pub fn is_known_column(name: &str) -> bool {
    find_column(name).is_some()
}
