//! Dataset ingestion.
//!
//! Submodules:
//! - `delimited`: turns uploaded delimiter-separated text into a [`Dataset`](crate::model::Dataset).

pub mod delimited;
