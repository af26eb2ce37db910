//! Presentation-ready views.
//!
//! Each view is a plain data structure of display strings handed to the
//! presentation layer. Views serialize with `serde` (see [`to_json`]) and
//! render as aligned text tables through `Display`.
//!
//! Rendering rules:
//! - Raw `Missing` cells render as [`MISSING_MARKER`], never `0` or blank.
//! - Derived values that cannot be computed render as [`NOT_APPLICABLE`], so
//!   they stay distinguishable from a computed `0.00`.
//! - Derived numbers use two decimals.

use crate::alert::anomaly::{AnomalyDetector, AnomalyReport};
use crate::analysis::features::{DERIVED_COLUMNS, engineer_features};
use crate::analysis::insights::{InsightsSummary, insights};
use crate::analysis::statistics::{STATISTIC_NAMES, stats_by_column};
use crate::config::AnalyticsConfig;
use crate::logging::{self, Component};
use crate::mapping::{MapFeed, map_feed};
use crate::model::{AnalyticsError, Dataset, FloodRecord, MISSING_MARKER};
use serde::Serialize;
use std::fmt;

/// Display marker for a derived value that cannot be computed.
pub const NOT_APPLICABLE: &str = "N/A";

fn fixed2(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NOT_APPLICABLE.to_string(),
    }
}

fn render_record(record: &FloodRecord) -> Vec<String> {
    record.values().iter().map(ToString::to_string).collect()
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
        .collect();
    writeln!(f, "{}", line.join("  ").trim_end())
}

/// Writes `headers` and `rows` as a left-aligned, space-padded table.
fn write_table(f: &mut fmt::Formatter<'_>, headers: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    write_row(f, headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(f, "{}", rule.join("  "))?;
    for row in rows {
        write_row(f, row, &widths)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dataset summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    /// The first rows, verbatim.
    pub preview: Vec<Vec<String>>,
}

pub fn dataset_summary(dataset: &Dataset, preview_rows: usize) -> DatasetSummary {
    DatasetSummary {
        row_count: dataset.len(),
        column_count: dataset.column_count(),
        headers: dataset.columns().to_vec(),
        preview: dataset
            .records()
            .iter()
            .take(preview_rows)
            .map(render_record)
            .collect(),
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: {} rows x {} columns", self.row_count, self.column_count)?;
        if self.headers.is_empty() {
            return Ok(());
        }
        write_table(f, &self.headers, &self.preview)
    }
}

// ---------------------------------------------------------------------------
// Statistics table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRow {
    pub statistic: String,
    /// One cell per numeric column.
    pub values: Vec<String>,
}

/// One row per statistic, one column per numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsTable {
    pub columns: Vec<String>,
    pub rows: Vec<StatisticsRow>,
}

pub fn statistics_table(dataset: &Dataset) -> StatisticsTable {
    let per_column = stats_by_column(dataset);

    let rows = STATISTIC_NAMES
        .iter()
        .map(|&name| StatisticsRow {
            statistic: name.to_string(),
            values: per_column
                .iter()
                .map(|(_, summary)| match (name, summary) {
                    ("count", Some(s)) => s.count.to_string(),
                    (_, Some(s)) => fixed2(s.get(name)),
                    (_, None) => NOT_APPLICABLE.to_string(),
                })
                .collect(),
        })
        .collect();

    StatisticsTable {
        columns: per_column.into_iter().map(|(column, _)| column).collect(),
        rows,
    }
}

impl fmt::Display for StatisticsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut headers = vec!["Statistic".to_string()];
        headers.extend(self.columns.iter().cloned());
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![r.statistic.clone()];
                cells.extend(r.values.iter().cloned());
                cells
            })
            .collect();
        write_table(f, &headers, &rows)
    }
}

// ---------------------------------------------------------------------------
// Feature view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureView {
    /// Original headers followed by the derived column names.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_records: usize,
}

/// Original fields plus derived features. `limit` caps the rendered rows;
/// `None` renders every record.
pub fn feature_view(dataset: &Dataset, limit: Option<usize>) -> FeatureView {
    let engineered = engineer_features(dataset);
    let take = limit.unwrap_or(engineered.len());

    let mut headers = dataset.columns().to_vec();
    headers.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));

    let rows = engineered
        .iter()
        .take(take)
        .map(|e| {
            let mut cells = render_record(e.record);
            cells.push(fixed2(e.features.rainfall_3day_avg));
            cells.push(fixed2(e.features.rainfall_7day_avg));
            cells.push(fixed2(e.features.water_level_change));
            cells.push(e.features.water_level_rising.to_string());
            cells
        })
        .collect();

    FeatureView {
        headers,
        rows,
        total_records: dataset.len(),
    }
}

impl fmt::Display for FeatureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Showing {} of {} records", self.rows.len(), self.total_records)?;
        write_table(f, &self.headers, &self.rows)
    }
}

// ---------------------------------------------------------------------------
// Anomaly view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRow {
    pub index: usize,
    pub value: String,
    pub score: String,
    /// `"Anomaly"` or `"Normal"`.
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyView {
    pub target_column: String,
    /// `false` when the dataset has no target column; every other field is
    /// then empty or not-applicable.
    pub applicable: bool,
    pub threshold: String,
    pub flagged_count: usize,
    pub normal_count: usize,
    /// Flagged share of all records, e.g. `"33.3%"`.
    pub anomaly_rate: String,
    /// Every record's flag and score, in dataset order.
    pub records: Vec<AnomalyRow>,
    /// Dataset headers for `anomalies`.
    pub headers: Vec<String>,
    /// Anomalous records, largest target value first.
    pub anomalies: Vec<Vec<String>>,
}

pub fn anomaly_view(dataset: &Dataset, report: &AnomalyReport) -> AnomalyView {
    let records = report
        .results
        .iter()
        .map(|r| AnomalyRow {
            index: r.index,
            value: dataset
                .record(r.index)
                .and_then(|record| record.get(&report.target_column))
                .map(ToString::to_string)
                .unwrap_or_else(|| MISSING_MARKER.to_string()),
            score: fixed2(r.score),
            flag: if r.is_anomaly { "Anomaly" } else { "Normal" }.to_string(),
        })
        .collect();

    let anomalies = report
        .ranked_anomalies()
        .iter()
        .filter_map(|r| dataset.record(r.index))
        .map(render_record)
        .collect();

    AnomalyView {
        target_column: report.target_column.clone(),
        applicable: true,
        threshold: fixed2(report.threshold),
        flagged_count: report.flagged_count(),
        normal_count: report.normal_count(),
        anomaly_rate: report
            .anomaly_rate_pct()
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        records,
        headers: dataset.columns().to_vec(),
        anomalies,
    }
}

/// The anomaly view for a dataset that lacks `target_column`.
pub fn anomaly_view_not_applicable(dataset: &Dataset, target_column: &str) -> AnomalyView {
    AnomalyView {
        target_column: target_column.to_string(),
        applicable: false,
        threshold: NOT_APPLICABLE.to_string(),
        flagged_count: 0,
        normal_count: 0,
        anomaly_rate: NOT_APPLICABLE.to_string(),
        records: Vec::new(),
        headers: dataset.columns().to_vec(),
        anomalies: Vec::new(),
    }
}

impl fmt::Display for AnomalyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.applicable {
            return writeln!(f, "Anomaly detection not applicable: no {} column.", self.target_column);
        }
        if self.flagged_count == 0 {
            return writeln!(f, "No anomalies detected in {}.", self.target_column);
        }
        writeln!(
            f,
            "{} anomalies detected in {} ({} of data, threshold score {})",
            self.flagged_count, self.target_column, self.anomaly_rate, self.threshold
        )?;
        write_table(f, &self.headers, &self.anomalies)
    }
}

// ---------------------------------------------------------------------------
// Insights view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsView {
    pub total_records: usize,
    pub mean_rainfall_mm: String,
    pub flood_rate: String,
    pub flood_occurrences: usize,
    pub max_rainfall_mm: String,
    pub min_rainfall_mm: String,
    pub mean_water_level_m: String,
}

pub fn insights_view(summary: &InsightsSummary) -> InsightsView {
    InsightsView {
        total_records: summary.total_records,
        mean_rainfall_mm: fixed2(summary.mean_rainfall_mm),
        flood_rate: summary
            .flood_rate_pct
            .map(|p| format!("{:.2}%", p))
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        flood_occurrences: summary.flood_occurrences,
        max_rainfall_mm: fixed2(summary.max_rainfall_mm),
        min_rainfall_mm: fixed2(summary.min_rainfall_mm),
        mean_water_level_m: fixed2(summary.mean_water_level_m),
    }
}

impl fmt::Display for InsightsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total records:     {}", self.total_records)?;
        writeln!(f, "Average rainfall:  {} mm", self.mean_rainfall_mm)?;
        writeln!(f, "Flood rate:        {} ({} occurrences)", self.flood_rate, self.flood_occurrences)?;
        writeln!(f, "Max rainfall:      {} mm", self.max_rainfall_mm)?;
        writeln!(f, "Min rainfall:      {} mm", self.min_rainfall_mm)?;
        writeln!(f, "Avg water level:   {} m", self.mean_water_level_m)
    }
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

/// Every view for one dataset, computed fresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub summary: DatasetSummary,
    pub statistics: StatisticsTable,
    pub features: FeatureView,
    pub anomalies: AnomalyView,
    pub insights: InsightsView,
    pub map: MapFeed,
}

/// Builds every view using `config`.
///
/// A dataset without the configured anomaly target column still gets every
/// other view; its anomaly view is marked not-applicable.
pub fn build_report(dataset: &Dataset, config: &AnalyticsConfig) -> AnalyticsReport {
    let detector = AnomalyDetector::from_config(&config.anomaly);
    let anomaly_report = match detector.detect(dataset) {
        Ok(report) => Some(report),
        Err(e) => {
            logging::warn(
                Component::Anomaly,
                Some(detector.target_column()),
                &format!("anomaly view not applicable: {}", e),
            );
            None
        }
    };

    let anomalies = match &anomaly_report {
        Some(report) => anomaly_view(dataset, report),
        None => anomaly_view_not_applicable(dataset, detector.target_column()),
    };

    AnalyticsReport {
        summary: dataset_summary(dataset, config.report.preview_rows),
        statistics: statistics_table(dataset),
        features: feature_view(dataset, config.report.feature_rows),
        anomalies,
        insights: insights_view(&insights(dataset)),
        map: map_feed(dataset, &config.mapping, anomaly_report.as_ref()),
    }
}

/// Renders any view as pretty-printed JSON.
pub fn to_json<T: Serialize>(view: &T) -> Result<String, AnalyticsError> {
    Ok(serde_json::to_string_pretty(view)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::delimited::parse_csv;

    const CSV: &str = "Date,Rainfall_mm,WaterLevel_m,FloodOccurrence\n\
                       2024-07-01,10,1.0,0\n\
                       2024-07-02,20,,0\n\
                       2024-07-03,200,5.0,1\n";

    #[test]
    fn test_summary_renders_missing_marker() {
        let summary = dataset_summary(&parse_csv(CSV), 10);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.column_count, 4);
        assert_eq!(summary.preview[1], vec!["2024-07-02", "20", MISSING_MARKER, "0"]);
    }

    #[test]
    fn test_summary_preview_is_capped() {
        let summary = dataset_summary(&parse_csv(CSV), 2);
        assert_eq!(summary.preview.len(), 2);
        assert_eq!(summary.row_count, 3);
    }

    #[test]
    fn test_statistics_table_layout() {
        let table = statistics_table(&parse_csv(CSV));
        assert_eq!(table.columns, vec!["Rainfall_mm", "WaterLevel_m", "FloodOccurrence"]);
        let names: Vec<&str> = table.rows.iter().map(|r| r.statistic.as_str()).collect();
        assert_eq!(names, STATISTIC_NAMES.to_vec());
        assert_eq!(table.rows[0].values, vec!["3", "2", "3"]);
        // Median of [10, 20, 200] is 20.
        assert_eq!(table.rows[4].values[0], "20.00");
    }

    #[test]
    fn test_feature_view_distinguishes_not_applicable_from_zero() {
        let ds = parse_csv("Rainfall_mm,WaterLevel_m\n0,1.0\n0,1.0\n0,1.0\n");
        let view = feature_view(&ds, None);
        assert_eq!(view.headers.len(), 2 + DERIVED_COLUMNS.len());
        assert_eq!(view.rows[0][2], NOT_APPLICABLE);
        assert_eq!(view.rows[2][2], "0.00");
        assert_eq!(view.rows[1][4], "0.00", "computed zero change");
        assert_eq!(view.rows[0][4], NOT_APPLICABLE);
        assert_eq!(view.rows[0][5], "0");
    }

    #[test]
    fn test_feature_view_limit() {
        let view = feature_view(&parse_csv(CSV), Some(1));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.total_records, 3);
    }

    #[test]
    fn test_anomaly_view_lists_ranked_records() {
        let ds = parse_csv(CSV);
        let report = AnomalyDetector::new().detect(&ds).unwrap();
        let view = anomaly_view(&ds, &report);
        assert_eq!(view.flagged_count, 1);
        assert_eq!(view.normal_count, 2);
        assert_eq!(view.anomaly_rate, "33.3%");
        assert_eq!(view.records[2].flag, "Anomaly");
        assert_eq!(view.records[0].flag, "Normal");
        assert_eq!(view.anomalies, vec![vec!["2024-07-03", "200", "5", "1"]]);
    }

    #[test]
    fn test_insights_view_formats() {
        let view = insights_view(&insights(&parse_csv(CSV)));
        assert_eq!(view.mean_rainfall_mm, "76.67");
        assert_eq!(view.flood_rate, "33.33%");
        assert_eq!(view.mean_water_level_m, "2.00");

        let empty = insights_view(&insights(&parse_csv("")));
        assert_eq!(empty.flood_rate, NOT_APPLICABLE);
        assert_eq!(empty.mean_rainfall_mm, NOT_APPLICABLE);
    }

    #[test]
    fn test_build_report_on_empty_upload() {
        let report = build_report(&parse_csv(""), &AnalyticsConfig::default());
        assert_eq!(report.summary.row_count, 0);
        assert!(report.statistics.columns.is_empty());
        assert!(report.features.rows.is_empty());
        assert_eq!(report.anomalies.flagged_count, 0);
        assert!(report.anomalies.applicable, "empty data accepts any column");
        assert_eq!(report.insights.flood_rate, NOT_APPLICABLE);
        assert!(report.map.markers.is_empty());
    }

    #[test]
    fn test_build_report_without_rainfall_keeps_other_views() {
        let ds = parse_csv("WaterLevel_m,FloodOccurrence\n1.0,0\n2.0,1\n");
        let report = build_report(&ds, &AnalyticsConfig::default());

        assert!(!report.anomalies.applicable);
        assert_eq!(report.anomalies.target_column, "Rainfall_mm");
        assert_eq!(report.anomalies.threshold, NOT_APPLICABLE);
        assert_eq!(report.anomalies.anomaly_rate, NOT_APPLICABLE);
        assert!(report.anomalies.records.is_empty());
        assert!(report.anomalies.to_string().contains("not applicable"));

        assert_eq!(report.summary.row_count, 2);
        assert_eq!(report.statistics.columns, vec!["WaterLevel_m", "FloodOccurrence"]);
        assert_eq!(report.insights.flood_rate, "50.00%");
        assert_eq!(report.insights.mean_rainfall_mm, NOT_APPLICABLE);
        assert_eq!(report.map.markers.len(), 2);
        assert!(report.map.markers.iter().all(|m| m.anomaly.is_none()));
    }

    #[test]
    fn test_detector_still_rejects_absent_target_column() {
        let ds = parse_csv("WaterLevel_m\n1.0\n");
        let err = AnomalyDetector::new().detect(&ds).unwrap_err();
        assert_eq!(err, AnalyticsError::ColumnNotFound("Rainfall_mm".to_string()));
    }

    #[test]
    fn test_anomaly_rows_show_text_verbatim() {
        let ds = parse_csv("Rainfall_mm,WaterLevel_m\n10,1.0\nheavy,1.0\n,1.0\n200,1.0\n");
        let report = AnomalyDetector::new().detect(&ds).unwrap();
        let view = anomaly_view(&ds, &report);
        let values: Vec<&str> = view.records.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["10", "heavy", MISSING_MARKER, "200"]);
        assert_eq!(view.records[1].score, NOT_APPLICABLE);
    }

    #[test]
    fn test_to_json_contains_views() {
        let report = build_report(&parse_csv(CSV), &AnalyticsConfig::default());
        let json = to_json(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["summary"]["row_count"], 3);
        assert_eq!(parsed["anomalies"]["flagged_count"], 1);
        assert_eq!(parsed["map"]["markers"][2]["anomaly"], true);
    }

    #[test]
    fn test_text_rendering() {
        let ds = parse_csv(CSV);
        let text = statistics_table(&ds).to_string();
        assert!(text.starts_with("Statistic"));
        assert!(text.contains("median"));

        let summary = dataset_summary(&ds, 10).to_string();
        assert!(summary.starts_with("Shape: 3 rows x 4 columns"));
        assert!(summary.contains(MISSING_MARKER));
    }
}
