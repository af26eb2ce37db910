//! Structured logging for the flood analytics pipeline.
//!
//! Provides context-rich logging tagged with the pipeline component and an
//! optional column name, with timestamps and severity levels. Supports both
//! console output and file-based logging. Nothing is emitted until
//! [`init_logger`] has been called, so library callers that never configure
//! logging get a silent pipeline.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Parser,
    Statistics,
    Features,
    Anomaly,
    Insights,
    Mapping,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Parser => write!(f, "PARSE"),
            Component::Statistics => write!(f, "STATS"),
            Component::Features => write!(f, "FEAT"),
            Component::Anomaly => write!(f, "ANOM"),
            Component::Insights => write!(f, "INSIGHT"),
            Component::Mapping => write!(f, "MAP"),
            Component::Config => write!(f, "CFG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, component: Component, column: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let column_part = column.map(|c| format!(" [{}]", c)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, column_part, message)
    }

    fn log(&self, level: LogLevel, component: Component, column: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, column, message);
        let column_part = column.map(|c| format!(" [{}]", c)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, column_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, column_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", component, column_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, column: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, column, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, column, message);
}

/// Log a warning message
pub fn warn(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, column, message);
}

/// Log an error message
pub fn error(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, column, message);
}

/// Log a debug message
pub fn debug(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, column, message);
}

// ---------------------------------------------------------------------------
// Ingest Summary Logging
// ---------------------------------------------------------------------------

/// Severity for a parse outcome: warning when the file held no records or
/// needed repairs, info otherwise.
fn parse_summary_level(rows: usize, padded: usize, truncated: usize) -> LogLevel {
    if rows == 0 || padded > 0 || truncated > 0 {
        LogLevel::Warning
    } else {
        LogLevel::Info
    }
}

/// Log the outcome of parsing one input file.
///
/// An empty or header-only upload is a valid, empty dataset, so it is only
/// worth a warning.
pub fn log_parse_summary(rows: usize, padded: usize, truncated: usize) {
    let message = if rows == 0 {
        "Parse complete: no data rows".to_string()
    } else {
        format!(
            "Parse complete: {} rows, {} padded short, {} truncated long",
            rows, padded, truncated
        )
    };
    dispatch(parse_summary_level(rows, padded, truncated), Component::Parser, None, &message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Holder {
            level: LogLevel,
        }
        let h: Holder = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(h.level, LogLevel::Warning);
        let h: Holder = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(h.level, LogLevel::Debug);
    }

    #[test]
    fn test_entry_format_includes_component_and_column() {
        let entry = Logger::format_entry(LogLevel::Warning, Component::Anomaly, Some("Rainfall_mm"), "zero variance");
        assert!(entry.ends_with("WARN ANOM [Rainfall_mm]: zero variance"), "got {}", entry);
    }

    #[test]
    fn test_parse_summary_levels() {
        assert_eq!(parse_summary_level(0, 0, 0), LogLevel::Warning, "empty upload is not an error");
        assert_eq!(parse_summary_level(5, 1, 0), LogLevel::Warning);
        assert_eq!(parse_summary_level(5, 0, 2), LogLevel::Warning);
        assert_eq!(parse_summary_level(5, 0, 0), LogLevel::Info);
    }
}
