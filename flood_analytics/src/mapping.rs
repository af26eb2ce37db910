//! Marker feed for the map view.
//!
//! The map widget itself lives outside this crate. It consumes a
//! [`MapFeed`]: the first `marker_limit` records as point markers carrying
//! their flood and anomaly flags, plus dataset-wide flooded/normal counts.

use crate::alert::anomaly::AnomalyReport;
use crate::config::MappingConfig;
use crate::logging::{self, Component};
use crate::model::Dataset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Position of the record in the dataset.
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    /// `true` when either coordinate came from the fallback centre.
    pub approximate: bool,
    pub flooded: bool,
    pub rainfall_mm: Option<f64>,
    pub water_level_m: Option<f64>,
    /// Anomaly flag, when an anomaly report was supplied.
    pub anomaly: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFeed {
    pub markers: Vec<MapMarker>,
    /// Flooded records across the whole dataset, not just the markers.
    pub flooded_count: usize,
    pub normal_count: usize,
}

/// Builds the marker feed.
///
/// Non-numeric coordinates fall back to the configured centre so every
/// record still gets a marker.
pub fn map_feed(dataset: &Dataset, config: &MappingConfig, anomalies: Option<&AnomalyReport>) -> MapFeed {
    let markers: Vec<MapMarker> = dataset
        .records()
        .iter()
        .take(config.marker_limit)
        .enumerate()
        .map(|(index, record)| {
            let lat = record.latitude();
            let lng = record.longitude();
            MapMarker {
                index,
                latitude: lat.unwrap_or(config.fallback_latitude),
                longitude: lng.unwrap_or(config.fallback_longitude),
                approximate: lat.is_none() || lng.is_none(),
                flooded: record.is_flooded(),
                rainfall_mm: record.rainfall_mm(),
                water_level_m: record.water_level_m(),
                anomaly: anomalies.map(|report| report.is_anomaly(index)),
            }
        })
        .collect();

    let approximate = markers.iter().filter(|m| m.approximate).count();
    if approximate > 0 {
        logging::debug(
            Component::Mapping,
            None,
            &format!("{} of {} markers placed at the fallback centre", approximate, markers.len()),
        );
    }

    let flooded_count = dataset.records().iter().filter(|r| r.is_flooded()).count();

    MapFeed {
        markers,
        flooded_count,
        normal_count: dataset.len() - flooded_count,
    }
}
