//! Dataset Verification Module
//!
//! Checks a parsed dataset against the known column registry and reports
//! which semantic columns are present and how clean their content is. The
//! report is informational: every analytics view still runs on a dataset
//! that fails verification, it just has more not-applicable cells.

use crate::columns::{COLUMN_REGISTRY, KnownColumn, is_known_column, required_columns};
use crate::model::{Dataset, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub row_count: usize,
    pub status: VerificationStatus,
    /// One entry per registry column, present or not.
    pub columns: Vec<ColumnVerification>,
    /// Required registry columns absent from the header.
    pub missing_required: Vec<String>,
    /// Header names outside the registry, in header order.
    pub unknown_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnVerification {
    pub name: String,
    pub unit: Option<String>,
    pub description: String,
    pub present: bool,
    pub required: bool,
    pub expected_numeric: bool,
    pub numeric_count: usize,
    pub text_count: usize,
    pub missing_count: usize,
    pub status: VerificationStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

/// Verifies `dataset`, stamping the report with the current time.
pub fn verify_dataset(dataset: &Dataset) -> VerificationReport {
    verify_dataset_at(dataset, Utc::now())
}

/// Verifies `dataset`, stamping the report with `now`.
///
/// Overall status is `Failed` when a required column fails, `PartialSuccess`
/// when any present known column has gaps or type mismatches, and `Success`
/// otherwise. Absent optional columns do not lower the status.
pub fn verify_dataset_at(dataset: &Dataset, now: DateTime<Utc>) -> VerificationReport {
    let columns: Vec<ColumnVerification> = COLUMN_REGISTRY
        .iter()
        .map(|known| verify_column(dataset, known))
        .collect();

    let status = if columns
        .iter()
        .any(|c| c.required && c.status == VerificationStatus::Failed)
    {
        VerificationStatus::Failed
    } else if columns
        .iter()
        .any(|c| c.present && c.status != VerificationStatus::Success)
    {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Success
    };

    let mut unknown_columns: Vec<String> = Vec::new();
    for name in dataset.columns() {
        if !is_known_column(name) && !unknown_columns.contains(name) {
            unknown_columns.push(name.clone());
        }
    }

    let missing_required: Vec<String> = required_columns()
        .into_iter()
        .filter(|name| !dataset.has_column(name))
        .map(String::from)
        .collect();

    VerificationReport {
        timestamp: now.to_rfc3339(),
        row_count: dataset.len(),
        status,
        columns,
        missing_required,
        unknown_columns,
    }
}

fn verify_column(dataset: &Dataset, known: &KnownColumn) -> ColumnVerification {
    let present = dataset.has_column(known.name);
    let (mut numeric_count, mut text_count, mut missing_count) = (0, 0, 0);

    if present {
        for value in dataset.records().iter().filter_map(|r| r.get(known.name)) {
            match value {
                Value::Number(_) => numeric_count += 1,
                Value::Text(_) => text_count += 1,
                Value::Missing => missing_count += 1,
            }
        }
    }

    let (status, message) = if !present {
        (VerificationStatus::Failed, Some("column not in header".to_string()))
    } else if known.numeric && numeric_count == 0 {
        (VerificationStatus::Failed, Some("no numeric values".to_string()))
    } else if known.numeric && text_count > 0 {
        (
            VerificationStatus::PartialSuccess,
            Some(format!("{} non-numeric values excluded from aggregates", text_count)),
        )
    } else if missing_count > 0 {
        (
            VerificationStatus::PartialSuccess,
            Some(format!("{} missing values", missing_count)),
        )
    } else {
        (VerificationStatus::Success, None)
    };

    ColumnVerification {
        name: known.name.to_string(),
        unit: known.unit.map(String::from),
        description: known.description.to_string(),
        present,
        required: known.required,
        expected_numeric: known.numeric,
        numeric_count,
        text_count,
        missing_count,
        status,
        message,
    }
}

// ============================================================================
// Tests
// ============================================================================
