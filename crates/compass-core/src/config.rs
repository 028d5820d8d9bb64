//! Configuration model for the Compass client.
//!
//! The on-disk representation is TOML (`config.toml`); every section falls
//! back to its defaults when omitted.

use serde::{Deserialize, Serialize};

use crate::session::ScoringConfig;

/// Default origin of the remote analysis service.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// File name of the exported report. Only its directory is configurable.
pub const EXPORT_FILE_NAME: &str = "alignment-report.pdf";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CompassConfig {
    /// Base origin all remote operations are sent to.
    pub api_base_url: String,
    /// Optional per-request timeout. Unset means requests run to completion.
    pub request_timeout_secs: Option<u64>,
    /// Scoring penalties a fresh session starts with.
    pub scoring: ScoringConfig,
    pub history: HistoryDisplayConfig,
    pub export: ExportConfig,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
            scoring: ScoringConfig::default(),
            history: HistoryDisplayConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// How history dates are rendered for display.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryDisplayConfig {
    /// chrono format string applied to each entry's timestamp.
    pub date_format: String,
    /// Render in UTC instead of the local time zone.
    pub utc: bool,
}

impl Default for HistoryDisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
            utc: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the export is written to; the working directory when unset.
    pub output_dir: Option<String>,
    /// Oversampling factor used when capturing the rendered report.
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            scale: 2.0,
        }
    }
}
