//! Flood analytics pipeline.
//!
//! Turns an uploaded table of flood sensor readings into the views of an
//! analytics dashboard:
//!
//! - [`ingest::delimited`] parses delimited text into a [`model::Dataset`].
//! - [`analysis::statistics`] computes per-column descriptive statistics.
//! - [`analysis::features`] derives rolling rainfall averages and
//!   water-level change.
//! - [`alert::anomaly`] flags rainfall outliers by z-score ranking.
//! - [`analysis::insights`] aggregates the headline numbers.
//! - [`mapping`] builds the marker feed for the map view.
//! - [`report`] renders all of the above as display-ready views.
//!
//! Every computation is a pure function of the dataset it is given.
//! Datasets are immutable once parsed, so views can be computed
//! concurrently from shared references.

pub mod alert;
pub mod analysis;
pub mod columns;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod report;
pub mod verify;
