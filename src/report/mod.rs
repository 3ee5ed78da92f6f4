//! Reporting
//!
//! Turns per-device outcomes into the run summary, the stdout report read
//! by the RMM agent and an optional Prometheus textfile.

pub mod console;
pub mod metrics;
pub mod summary;

pub use console::*;
pub use metrics::*;
pub use summary::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Marks the start of the block the RMM agent captures
pub const START_MARKER: &str = "<-Start Result->";
/// Marks the end of the captured block
pub const END_MARKER: &str = "<-End Result->";

/// Reporting configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Prometheus textfile target; nothing is written when unset
    pub metrics_file: Option<PathBuf>,
    /// Count unprocessable devices as a failed run
    pub fail_on_device_error: bool,
}

/// Wrap a rendered body in the result markers
pub fn framed(body: &str) -> String {
    let body = body.trim_end_matches('\n');
    format!("{}\n{}\n{}\n", START_MARKER, body, END_MARKER)
}

/// Report body for a run that failed before any device was examined
pub fn render_run_failure(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "ERROR: {}\n\nStatus: WARNING - Disk health could not be checked.\n",
            message
        ),
        OutputFormat::Json => serde_json::json!({
            "error": message,
            "summary": { "exit_code": EXIT_PROBLEM },
        })
        .to_string(),
    }
}
