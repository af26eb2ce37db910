//! Pipeline configuration.
//!
//! Settings are read from a TOML file. Every field has a default, so an empty
//! file (or no file at all) yields the dashboard defaults: comma-delimited
//! input, 5% contamination on `Rainfall_mm`, ten preview rows and one hundred
//! map markers.
//!
//! ```toml
//! [parser]
//! delimiter = ","
//!
//! [anomaly]
//! contamination = 0.05
//! target_column = "Rainfall_mm"
//!
//! [report]
//! preview_rows = 10
//! feature_rows = 20
//!
//! [mapping]
//! marker_limit = 100
//!
//! [logging]
//! level = "info"
//! ```

use crate::logging::{self, Component, LogLevel};
use crate::model::{AnalyticsError, COL_RAINFALL};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file. Read after loading `.env`.
pub const CONFIG_PATH_ENV: &str = "FLOOD_ANALYTICS_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Single-character cell delimiter.
    pub delimiter: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

impl ParserConfig {
    /// The delimiter as a `char`. Only meaningful after [`AnalyticsConfig::validate`].
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(',')
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Expected anomalous fraction, in `[0, 1)`.
    pub contamination: f64,
    pub target_column: String,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            target_column: COL_RAINFALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows shown in the dataset summary preview.
    pub preview_rows: usize,
    /// Rows shown in the feature view; `None` shows every record.
    pub feature_rows: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            feature_rows: Some(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub marker_limit: usize,
    /// Used for records whose latitude is not numeric.
    pub fallback_latitude: f64,
    /// Used for records whose longitude is not numeric.
    pub fallback_longitude: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            marker_limit: 100,
            fallback_latitude: 14.6,
            fallback_longitude: 121.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub parser: ParserConfig,
    pub anomaly: AnomalyConfig,
    pub report: ReportConfig,
    pub mapping: MappingConfig,
    pub logging: LoggingConfig,
}

impl AnalyticsConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, AnalyticsError> {
        let config: AnalyticsConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalyticsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env` if present, then reads the file named by
    /// [`CONFIG_PATH_ENV`]. Falls back to defaults when the variable is unset.
    pub fn load_from_env() -> Result<Self, AnalyticsError> {
        dotenv::dotenv().ok();

        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                logging::info(Component::Config, None, &format!("Loading config from {}", path));
                Self::from_file(path)
            }
            Err(_) => {
                logging::debug(
                    Component::Config,
                    None,
                    &format!("{} not set, using default config", CONFIG_PATH_ENV),
                );
                Ok(Self::default())
            }
        }
    }

    /// Rejects values the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let c = self.anomaly.contamination;
        if !(0.0..1.0).contains(&c) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "anomaly.contamination must be in [0, 1), got {}",
                c
            )));
        }
        if self.parser.delimiter.chars().count() != 1 {
            return Err(AnalyticsError::InvalidConfig(format!(
                "parser.delimiter must be exactly one character, got {:?}",
                self.parser.delimiter
            )));
        }
        if self.anomaly.target_column.trim().is_empty() {
            return Err(AnalyticsError::InvalidConfig(
                "anomaly.target_column must not be empty".to_string(),
            ));
        }
        if self.mapping.marker_limit == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "mapping.marker_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Installs the global logger described by the `[logging]` section.
    pub fn init_logging(&self) {
        logging::init_logger(
            self.logging.level,
            self.logging.file.as_deref(),
            self.logging.console_timestamps,
        );
    }
}
