//! Derived analytical views over a [`Dataset`](crate::model::Dataset).
//!
//! Every function here is a pure computation over the immutable dataset and
//! is recomputed on each call; nothing is cached.
//!
//! Submodules:
//! - `statistics`: per-column descriptive statistics.
//! - `features`: rolling rainfall averages and water level change flags.
//! - `insights`: dataset-wide flood risk scalars.

pub mod features;
pub mod insights;
pub mod statistics;
