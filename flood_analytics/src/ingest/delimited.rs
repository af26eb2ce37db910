//! Delimited text parser.
//!
//! Turns the raw content of one uploaded file into a [`Dataset`]. The first
//! non-blank line is the header; each later non-blank line is a row whose
//! cells are typed with [`Value::infer`].
//!
//! # Limitations
//! Quoting is not supported: a quoted field containing the delimiter is split
//! like any other cell, and embedded newlines start a new row.
//!
//! # Failure model
//! Parsing never fails. Short rows are padded with `Missing`, long rows are
//! truncated to the header width, and unparseable cells become `Text`. Only
//! [`DelimitedParser::parse_file`] can fail, and only on I/O.

use crate::config::ParserConfig;
use crate::logging::{self, Component};
use crate::model::{AnalyticsError, Dataset, Value};
use std::path::Path;

/// Counts describing how a parse went, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseSummary {
    pub rows: usize,
    /// Rows with fewer cells than the header.
    pub padded_rows: usize,
    /// Rows with more cells than the header.
    pub truncated_rows: usize,
}

#[derive(Debug, Clone)]
pub struct DelimitedParser {
    delimiter: char,
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedParser {
    /// Comma-delimited parser.
    pub fn new() -> Self {
        Self { delimiter: ',' }
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::with_delimiter(config.delimiter_char())
    }

    /// Parses `input` into a dataset, logging a summary of the result.
    pub fn parse_str(&self, input: &str) -> Dataset {
        let (dataset, summary) = self.parse_with_summary(input);
        logging::log_parse_summary(summary.rows, summary.padded_rows, summary.truncated_rows);
        dataset
    }

    /// Parses `input` and reports how many rows needed repair.
    pub fn parse_with_summary(&self, input: &str) -> (Dataset, ParseSummary) {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut lines = input.lines().filter(|line| !line.trim().is_empty());

        let Some(header_line) = lines.next() else {
            return (Dataset::empty(), ParseSummary::default());
        };

        let headers: Vec<String> = header_line
            .split(self.delimiter)
            .map(|h| h.trim().to_string())
            .collect();
        let width = headers.len();

        let mut summary = ParseSummary::default();
        let mut rows = Vec::new();

        for (line_no, line) in lines.enumerate() {
            let cells: Vec<Value> = line.split(self.delimiter).map(Value::infer).collect();

            if cells.len() < width {
                summary.padded_rows += 1;
            } else if cells.len() > width {
                summary.truncated_rows += 1;
                logging::debug(
                    Component::Parser,
                    None,
                    &format!(
                        "row {} has {} cells for {} columns; extra cells dropped",
                        line_no + 1,
                        cells.len(),
                        width
                    ),
                );
            }
            rows.push(cells);
        }

        summary.rows = rows.len();
        (Dataset::new(headers, rows), summary)
    }

    /// Reads and parses a file from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Dataset, AnalyticsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(self.parse_str(&text))
    }
}

/// Parses comma-delimited text with default settings.
pub fn parse_csv(input: &str) -> Dataset {
    DelimitedParser::new().parse_str(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_flood_csv() {
        let csv = "Date,Rainfall_mm,WaterLevel_m,FloodOccurrence\n\
                   2024-07-01,10,1.0,0\n\
                   2024-07-02,20,1.5,0\n\
                   2024-07-03,200,5.0,1\n";
        let ds = parse_csv(csv);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_count(), 4);
        assert_eq!(ds.columns()[1], "Rainfall_mm");
        assert_eq!(ds.record(2).unwrap().rainfall_mm(), Some(200.0));
        assert_eq!(ds.record(2).unwrap().get("Date"), Some(&Value::Text("2024-07-03".to_string())));
        assert!(ds.record(2).unwrap().is_flooded());
    }

    #[test]
    fn test_empty_input_yields_empty_dataset() {
        let ds = parse_csv("");
        assert!(ds.is_empty());
        assert_eq!(ds.column_count(), 0);

        let ds = parse_csv("\n   \n\r\n");
        assert!(ds.is_empty());
    }

    #[test]
    fn test_header_only_keeps_columns() {
        let ds = parse_csv("Rainfall_mm,WaterLevel_m\n");
        assert!(ds.is_empty());
        assert_eq!(ds.columns(), &["Rainfall_mm".to_string(), "WaterLevel_m".to_string()]);
    }

    #[test]
    fn test_blank_lines_and_crlf_skipped() {
        let csv = "Rainfall_mm, WaterLevel_m \r\n\r\n5,1.0\r\n   \r\n6,1.1\r\n";
        let ds = parse_csv(csv);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns()[1], "WaterLevel_m", "header names are trimmed");
        assert_eq!(ds.record(1).unwrap().water_level_m(), Some(1.1));
    }

    #[test]
    fn test_short_rows_padded_with_missing() {
        let (ds, summary) = DelimitedParser::new().parse_with_summary("a,b,c\n1\n1,2,3\n");
        assert_eq!(summary.padded_rows, 1);
        assert_eq!(summary.truncated_rows, 0);
        let rec = ds.record(0).unwrap();
        assert_eq!(rec.get("b"), Some(&Value::Missing));
        assert_eq!(rec.get("c"), Some(&Value::Missing));
    }

    #[test]
    fn test_long_rows_truncated_to_header() {
        let (ds, summary) = DelimitedParser::new().parse_with_summary("a,b\n1,2,3,4\n");
        assert_eq!(summary.truncated_rows, 1);
        assert_eq!(ds.record(0).unwrap().values().len(), 2);
    }

    #[test]
    fn test_empty_cells_are_missing_not_zero() {
        let ds = parse_csv("Rainfall_mm,WaterLevel_m\n,1.0\n");
        let rec = ds.record(0).unwrap();
        assert_eq!(rec.get("Rainfall_mm"), Some(&Value::Missing));
        assert_eq!(rec.rainfall_mm(), None);
    }

    #[test]
    fn test_unparseable_cell_becomes_text() {
        let ds = parse_csv("Rainfall_mm\nheavy\n12\n");
        assert_eq!(ds.record(0).unwrap().get("Rainfall_mm"), Some(&Value::Text("heavy".to_string())));
        assert_eq!(ds.numeric_values("Rainfall_mm"), vec![12.0]);
    }

    #[test]
    fn test_quoted_delimiter_is_not_special() {
        let ds = parse_csv("Station,Rainfall_mm\n\"Quezon, City\",12\n");
        let rec = ds.record(0).unwrap();
        assert_eq!(rec.get("Station"), Some(&Value::Text("\"Quezon".to_string())));
        assert_eq!(rec.get("Rainfall_mm"), Some(&Value::Text("City\"".to_string())));
    }

    #[test]
    fn test_custom_delimiter() {
        let ds = DelimitedParser::with_delimiter(';').parse_str("Rainfall_mm;WaterLevel_m\n3,5;1.0\n");
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.record(0).unwrap().get("Rainfall_mm"), Some(&Value::Text("3,5".to_string())));
        assert_eq!(ds.record(0).unwrap().water_level_m(), Some(1.0));
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let ds = parse_csv("\u{feff}Rainfall_mm\n4\n");
        assert!(ds.has_column("Rainfall_mm"));
    }

    #[test]
    fn test_unknown_columns_retained_in_order() {
        let ds = parse_csv("Rainfall_mm,Barangay,Humidity\n4,San Roque,88\n");
        let cols: Vec<&str> = ds.record(0).unwrap().iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["Rainfall_mm", "Barangay", "Humidity"]);
        assert_eq!(ds.record(0).unwrap().number("Humidity"), Some(88.0));
    }

    #[test]
    fn test_parse_file_missing_path_is_io_error() {
        let err = DelimitedParser::new().parse_file("/nonexistent/flood.csv").unwrap_err();
        assert!(matches!(err, AnalyticsError::Io(_)));
    }
}
