//! Contamination-based score thresholds.
//!
//! Given anomaly scores and an expected anomalous fraction, picks the cutoff
//! score by full descending sort and fixed-index selection. Every score equal
//! to the cutoff is anomalous, so ties can push the flagged count above
//! `N × contamination`.

/// Position of the cutoff in the descending score list.
///
/// `floor(n × contamination)`, clamped to the last index. Callers guarantee
/// `n > 0`.
pub fn threshold_index(n: usize, contamination: f64) -> usize {
    let raw = (n as f64 * contamination).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(n - 1)
    }
}

/// The cutoff score for `scores`, or `None` when there are no scores.
pub fn contamination_threshold(scores: &[f64], contamination: f64) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    Some(sorted[threshold_index(sorted.len(), contamination)])
}

/// Inclusive comparison against the cutoff.
pub fn exceeds_threshold(score: f64, threshold: f64) -> bool {
    score >= threshold
}
