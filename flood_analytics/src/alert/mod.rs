//! Record-level flagging.
//!
//! Submodules:
//! - `thresholds`: contamination-based cutoff selection over a score list.
//! - `anomaly`: z-score scoring of a target column and the resulting flags.

pub mod anomaly;
pub mod thresholds;
