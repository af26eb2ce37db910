//! Univariate rainfall anomaly detection.
//!
//! Scores each record by its absolute z-score on the target column and flags
//! the top `contamination` fraction, ties included. This is a ranking
//! heuristic, not an isolation forest or any other model.
//!
//! Policies:
//! - Records whose target cell is not a `Number` get no score and are never
//!   flagged. They do not count toward `N` for the threshold index.
//! - When the population deviation is zero every score is 0 and nothing is
//!   flagged.

use crate::alert::thresholds::{contamination_threshold, exceeds_threshold};
use crate::analysis::statistics::population_mean_std;
use crate::config::AnomalyConfig;
use crate::logging::{self, Component};
use crate::model::{AnalyticsError, COL_RAINFALL, Dataset};
use serde::Serialize;

pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Score and flag for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult {
    /// Position of the record in the dataset.
    pub index: usize,
    /// The raw target value, when numeric.
    pub value: Option<f64>,
    /// `|value - mean| / std`; `None` when `value` is.
    pub score: Option<f64>,
    pub is_anomaly: bool,
}

/// Detector output for a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub target_column: String,
    pub contamination: f64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    /// Cutoff score; `None` when nothing was scored.
    pub threshold: Option<f64>,
    /// One entry per record, in dataset order.
    pub results: Vec<AnomalyResult>,
}

impl AnomalyReport {
    pub fn flagged_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_anomaly).count()
    }

    pub fn normal_count(&self) -> usize {
        self.results.len() - self.flagged_count()
    }

    pub fn is_anomaly(&self, index: usize) -> bool {
        self.results.get(index).is_some_and(|r| r.is_anomaly)
    }

    pub fn anomalous_indices(&self) -> Vec<usize> {
        self.results
            .iter()
            .filter(|r| r.is_anomaly)
            .map(|r| r.index)
            .collect()
    }

    /// Anomalous records sorted by raw target value, largest first.
    ///
    /// Records with equal values keep dataset order.
    pub fn ranked_anomalies(&self) -> Vec<&AnomalyResult> {
        let mut ranked: Vec<&AnomalyResult> = self.results.iter().filter(|r| r.is_anomaly).collect();
        ranked.sort_by(|a, b| {
            let a = a.value.unwrap_or(f64::NEG_INFINITY);
            let b = b.value.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });
        ranked
    }

    /// Flagged records as a percentage of all records; `None` when empty.
    pub fn anomaly_rate_pct(&self) -> Option<f64> {
        if self.results.is_empty() {
            None
        } else {
            Some(100.0 * self.flagged_count() as f64 / self.results.len() as f64)
        }
    }
}

/// `|v - mean| / std`, or 0 when `std` is 0.
///
/// The difference is halved first when it would overflow. `None` when the
/// score itself is not finite.
fn z_score(v: f64, mean: f64, std: f64) -> Option<f64> {
    if std == 0.0 {
        return Some(0.0);
    }
    let diff = v - mean;
    let score = if diff.is_finite() {
        diff.abs() / std
    } else {
        (v / 2.0 - mean / 2.0).abs() / std * 2.0
    };
    score.is_finite().then_some(score)
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    contamination: f64,
    target_column: String,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    /// Rainfall detector with 5% contamination.
    pub fn new() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            target_column: COL_RAINFALL.to_string(),
        }
    }

    pub fn from_config(config: &AnomalyConfig) -> Self {
        Self {
            contamination: config.contamination,
            target_column: config.target_column.clone(),
        }
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_target_column(mut self, column: &str) -> Self {
        self.target_column = column.to_string();
        self
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Scores and flags every record.
    ///
    /// Fails only when a populated dataset has no target column.
    pub fn detect(&self, dataset: &Dataset) -> Result<AnomalyReport, AnalyticsError> {
        dataset.require_column(&self.target_column)?;

        let series = dataset.numeric_series(&self.target_column);
        let present: Vec<f64> = series.iter().flatten().copied().collect();
        let moments = population_mean_std(&present);

        let scores: Vec<Option<f64>> = series
            .iter()
            .map(|value| {
                let v = (*value)?;
                let (mean, std) = moments?;
                z_score(v, mean, std)
            })
            .collect();

        let scored: Vec<f64> = scores.iter().flatten().copied().collect();
        let threshold = contamination_threshold(&scored, self.contamination);
        let has_spread = moments.is_some_and(|(_, std)| std > 0.0 && std.is_finite());

        if !has_spread && !scored.is_empty() {
            logging::debug(
                Component::Anomaly,
                Some(&self.target_column),
                "zero deviation; no records flagged",
            );
        }

        let results: Vec<AnomalyResult> = series
            .iter()
            .zip(scores.iter())
            .enumerate()
            .map(|(index, (value, score))| AnomalyResult {
                index,
                value: *value,
                score: *score,
                is_anomaly: match (score, threshold) {
                    (Some(s), Some(t)) => has_spread && exceeds_threshold(*s, t),
                    _ => false,
                },
            })
            .collect();

        let report = AnomalyReport {
            target_column: self.target_column.clone(),
            contamination: self.contamination,
            mean: moments.map(|(m, _)| m),
            std: moments.map(|(_, s)| s),
            threshold,
            results,
        };

        logging::info(
            Component::Anomaly,
            Some(&self.target_column),
            &format!(
                "{} of {} records flagged (contamination {})",
                report.flagged_count(),
                report.results.len(),
                self.contamination
            ),
        );

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
