//! Core data types for the flood analytics pipeline.
//!
//! This module defines the shared domain model imported by all other modules:
//! the three-way cell [`Value`], the [`FloodRecord`] row, the immutable
//! [`Dataset`] table, and the crate-wide [`AnalyticsError`]. It contains no
//! I/O and no analytics, only types and their accessors.

use chrono::{DateTime, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Known column names
// ---------------------------------------------------------------------------

/// Daily rainfall, in millimetres. Expected on every record.
pub const COL_RAINFALL: &str = "Rainfall_mm";

/// River or channel water level, in metres.
pub const COL_WATER_LEVEL: &str = "WaterLevel_m";

/// 1 when a flood was observed for the record, 0 otherwise.
pub const COL_FLOOD_OCCURRENCE: &str = "FloodOccurrence";

/// WGS84 latitude of the sensor.
pub const COL_LATITUDE: &str = "Latitude";

/// WGS84 longitude of the sensor.
pub const COL_LONGITUDE: &str = "Longitude";

/// Observation date. Kept verbatim; parsed on demand by [`FloodRecord::date`].
pub const COL_DATE: &str = "Date";

/// Display marker for a raw cell that holds no value.
pub const MISSING_MARKER: &str = "—";

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single typed cell.
///
/// Empty cells are `Missing`, never `Number(0.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Infers the type of a raw cell.
    ///
    /// Trimmed-empty → `Missing`; finite numeric literal → `Number`;
    /// anything else (including `NaN` and `inf`) → `Text`.
    pub fn infer(raw: &str) -> Value {
        let cell = raw.trim();
        if cell.is_empty() {
            return Value::Missing;
        }
        match cell.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(cell.to_string()),
        }
    }

    /// The numeric payload, or `None` for `Text` and `Missing`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "{}", MISSING_MARKER),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of the dataset: the shared header plus this row's cells.
///
/// Known semantic fields have typed accessors; every other column stays
/// reachable through [`FloodRecord::get`] in header order. When the header
/// repeats a name, the last cell carrying it wins.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodRecord {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl FloodRecord {
    /// Builds a record against `columns`, padding with `Missing` or
    /// dropping surplus cells so the row matches the header exactly.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Missing);
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates `(column, value)` pairs in header order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// The cell for `column`, or `None` if the header has no such column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        column_index(&self.columns, column).map(|i| &self.values[i])
    }

    /// The numeric value of `column`; `Text`, `Missing` and absent all read as `None`.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    pub fn rainfall_mm(&self) -> Option<f64> {
        self.number(COL_RAINFALL)
    }

    pub fn water_level_m(&self) -> Option<f64> {
        self.number(COL_WATER_LEVEL)
    }

    pub fn flood_occurrence(&self) -> Option<f64> {
        self.number(COL_FLOOD_OCCURRENCE)
    }

    /// `true` only when `FloodOccurrence` is exactly 1.
    pub fn is_flooded(&self) -> bool {
        self.flood_occurrence() == Some(1.0)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.number(COL_LATITUDE)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.number(COL_LONGITUDE)
    }

    /// Parses the `Date` cell.
    ///
    /// Accepts `YYYY-MM-DD`, `MM/DD/YYYY` and RFC 3339 timestamps. Returns
    /// `None` when the column is absent, empty, or not a recognizable date;
    /// the raw text is still available through [`FloodRecord::get`].
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.get(COL_DATE)?.as_text()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

impl Serialize for FloodRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Index of the last header cell named `column`.
fn column_index(columns: &[String], column: &str) -> Option<usize> {
    columns.iter().rposition(|c| c == column)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The immutable, ordered table produced by the parser.
///
/// Record position is temporal order. Every record shares the same header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Arc<[String]>,
    records: Vec<FloodRecord>,
}

impl Dataset {
    /// Builds a dataset from a header and raw rows. Rows are normalized to
    /// the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = columns.into();
        let records = rows
            .into_iter()
            .map(|row| FloodRecord::new(Arc::clone(&columns), row))
            .collect();
        Self { columns, records }
    }

    /// A dataset with no header and no records, as produced by an empty file.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        column_index(&self.columns, column).is_some()
    }

    pub fn records(&self) -> &[FloodRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&FloodRecord> {
        self.records.get(index)
    }

    /// Per-record numeric view of `column`, in dataset order.
    ///
    /// Every position is present; non-numeric cells are `None`.
    pub fn numeric_series(&self, column: &str) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.number(column)).collect()
    }

    /// The numeric values of `column` with non-numeric cells skipped.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.number(column)).collect()
    }

    /// Fails with [`AnalyticsError::ColumnNotFound`] when a populated dataset
    /// lacks `column`. A dataset with no records accepts any column, so views
    /// over an empty upload degrade to "no data" instead of erroring.
    pub fn require_column(&self, column: &str) -> Result<(), AnalyticsError> {
        if self.is_empty() || self.has_column(column) {
            Ok(())
        } else {
            Err(AnalyticsError::ColumnNotFound(column.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise from caller mistakes, configuration, or file I/O.
///
/// Malformed dataset content never produces an error; it degrades to
/// `Missing`/`Text` cells and not-applicable results instead.
#[derive(Debug, PartialEq)]
pub enum AnalyticsError {
    /// A view was requested for a column the dataset does not have.
    ColumnNotFound(String),
    /// A configuration value is outside its valid range.
    InvalidConfig(String),
    /// The configuration file could not be deserialized.
    ConfigParse(String),
    /// Reading an input or configuration file failed.
    Io(String),
    /// A view could not be rendered to JSON.
    Serialization(String),
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::ColumnNotFound(col) => write!(f, "Column not found: {}", col),
            AnalyticsError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            AnalyticsError::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            AnalyticsError::Io(msg) => write!(f, "I/O error: {}", msg),
            AnalyticsError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AnalyticsError {}

impl From<std::io::Error> for AnalyticsError {
    fn from(e: std::io::Error) -> Self {
        AnalyticsError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for AnalyticsError {
    fn from(e: toml::de::Error) -> Self {
        AnalyticsError::ConfigParse(e.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        AnalyticsError::Serialization(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
