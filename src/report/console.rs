//! Console Report
//!
//! Human-readable and JSON renderings of a scan, as printed to stdout for
//! the monitoring agent.

use super::summary::ScanReport;
use crate::domain::ports::{DeviceHealthRecord, Verdict};
use crate::error::Result;
use crate::hardware::discovery::DeviceOutcome;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const RULE: &str = "----------------------------------------";
const BYTES_PER_TB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// =============================================================================
// Value Formatting
// =============================================================================

pub fn format_temperature(celsius: Option<i32>) -> String {
    celsius
        .map(|c| format!("{} °C", c))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Power-on hours as days and hours
pub fn format_power_on(hours: Option<u64>) -> String {
    hours
        .map(|h| format!("{} days, {} hours", h / 24, h % 24))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_percent(percent: Option<u8>) -> String {
    percent
        .map(|p| format!("{}%", p))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Byte count in binary terabytes with two decimals
pub fn format_terabytes(bytes: Option<u64>) -> String {
    bytes
        .map(|b| format!("{:.2} TB", b as f64 / BYTES_PER_TB))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_count(count: Option<u64>) -> String {
    count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a scan as text
pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "===== S.M.A.R.T. Disk Health Report =====");
    let _ = writeln!(out, "Date: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "System: {}", report.hostname);
    let _ = writeln!(out, "Total Disks: {}", report.summary.total_devices);
    let _ = writeln!(out);

    for outcome in &report.devices {
        match outcome {
            DeviceOutcome::Assessed(device) => render_device(&mut out, &device.device_id, &device.record),
            DeviceOutcome::Failed { device_id, reason } => {
                let _ = writeln!(out, "{}", RULE);
                let _ = writeln!(out, "ERROR processing disk {}: {}", device_id, reason);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "===== Summary =====");

    let findings: Vec<_> = report.findings().collect();
    if findings.is_empty() {
        let _ = writeln!(out, "All disks appear to be healthy.");
    } else {
        let _ = writeln!(out, "CRITICAL ISSUES DETECTED:");
        for finding in &findings {
            let _ = writeln!(out, "- [{}] {}", finding.severity, finding);
        }
    }

    if report.summary.processing_errors > 0 {
        let _ = writeln!(
            out,
            "Disks that could not be processed: {}",
            report.summary.processing_errors
        );
    }

    let _ = writeln!(out);
    match report.summary.verdict {
        Verdict::Warning => {
            let _ = writeln!(
                out,
                "Status: WARNING - Critical disk issues detected ({} critical, {} warning). See details above.",
                report.summary.critical_findings, report.summary.warning_findings
            );
        }
        Verdict::Ok if report.exit_code() != 0 => {
            let _ = writeln!(out, "Status: WARNING - Some disks could not be processed.");
        }
        Verdict::Ok => {
            let _ = writeln!(out, "Status: OK - No critical disk issues detected.");
        }
    }

    out
}

fn render_device(out: &mut String, device_id: &str, record: &DeviceHealthRecord) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Disk: {}", device_id);
    let _ = writeln!(out, "Model: {}", record.model);
    let _ = writeln!(out, "Type: {}", record.media_label());
    let _ = writeln!(out, "Serial: {}", record.serial_number);
    let _ = writeln!(out, "Health Status: {}", record.overall_health);
    let _ = writeln!(out, "Temperature: {}", format_temperature(record.temperature_celsius));
    let _ = writeln!(out, "Power-On Time: {}", format_power_on(record.power_on_hours));

    if record.is_solid_state {
        let _ = writeln!(out, "SSD Life Remaining: {}", format_percent(record.life_remaining_percent));
        let _ = writeln!(out, "Total Data Written: {}", format_terabytes(record.total_bytes_written));
        let _ = writeln!(out, "Total Data Read: {}", format_terabytes(record.total_bytes_read));
    } else {
        let _ = writeln!(out, "Reallocated Sectors: {}", format_count(record.reallocated_sector_count));
        let _ = writeln!(out, "Pending Sectors: {}", format_count(record.pending_sector_count));
        let _ = writeln!(out, "Uncorrectable Sectors: {}", format_count(record.uncorrectable_sector_count));
    }
}

/// Render a scan as pretty-printed JSON
pub fn render_json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render in the requested format
pub fn render(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
    }
}
