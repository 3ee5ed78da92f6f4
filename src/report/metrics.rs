//! Prometheus Textfile Export
//!
//! Renders a scan into the Prometheus text format for node_exporter's
//! textfile collector. Each export uses its own registry, so repeated runs
//! in one process never collide with globally registered metrics.

use super::summary::ScanReport;
use crate::domain::ports::{HealthStatus, Severity};
use crate::error::{Error, Result};
use prometheus::{Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::fs;
use std::path::Path;
use tracing::debug;

const DEVICE_LABELS: &[&str] = &["device", "model"];

fn metric_err(e: prometheus::Error) -> Error {
    Error::Internal(format!("Metric registration failed: {}", e))
}

/// Gauges describing one scan run
pub struct MetricsExporter {
    registry: Registry,
    temperature: IntGaugeVec,
    power_on_hours: IntGaugeVec,
    life_remaining: IntGaugeVec,
    sectors: IntGaugeVec,
    health_passed: IntGaugeVec,
    findings: IntGaugeVec,
    devices: IntGauge,
    processing_errors: IntGauge,
    exit_code: IntGauge,
    last_run: IntGauge,
}

impl MetricsExporter {
    /// Create an exporter with all gauges registered
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let device_vec = |name: &str, help: &str| -> Result<IntGaugeVec> {
            let gauge = IntGaugeVec::new(Opts::new(name, help), DEVICE_LABELS).map_err(metric_err)?;
            registry.register(Box::new(gauge.clone())).map_err(metric_err)?;
            Ok(gauge)
        };

        let temperature = device_vec("smart_disk_temperature_celsius", "Current drive temperature")?;
        let power_on_hours = device_vec("smart_disk_power_on_hours", "Accumulated power-on hours")?;
        let life_remaining = device_vec(
            "smart_disk_life_remaining_percent",
            "Remaining rated endurance of solid-state media",
        )?;
        let health_passed = device_vec(
            "smart_disk_health_passed",
            "1 if the overall self-assessment passed, 0 otherwise",
        )?;

        let sectors = IntGaugeVec::new(
            Opts::new("smart_disk_sector_count", "Problem sector counters"),
            &["device", "model", "counter"],
        )
        .map_err(metric_err)?;
        registry.register(Box::new(sectors.clone())).map_err(metric_err)?;

        let findings = IntGaugeVec::new(
            Opts::new("smart_disk_findings", "Findings raised for a device"),
            &["device", "model", "severity"],
        )
        .map_err(metric_err)?;
        registry.register(Box::new(findings.clone())).map_err(metric_err)?;

        let run_gauge = |name: &str, help: &str| -> Result<IntGauge> {
            let gauge = IntGauge::with_opts(Opts::new(name, help)).map_err(metric_err)?;
            registry.register(Box::new(gauge.clone())).map_err(metric_err)?;
            Ok(gauge)
        };

        let devices = run_gauge("smart_disk_scan_devices", "Devices examined in the last run")?;
        let processing_errors = run_gauge(
            "smart_disk_scan_processing_errors",
            "Devices that could not be processed in the last run",
        )?;
        let exit_code = run_gauge("smart_disk_scan_exit_code", "Exit code of the last run")?;
        let last_run = run_gauge(
            "smart_disk_scan_timestamp_seconds",
            "Unix time the last run completed",
        )?;

        Ok(Self {
            registry,
            temperature,
            power_on_hours,
            life_remaining,
            sectors,
            health_passed,
            findings,
            devices,
            processing_errors,
            exit_code,
            last_run,
        })
    }

    /// Load gauges from a scan report. Unset values are not exported.
    pub fn record(&self, report: &ScanReport) {
        for device in report.devices.iter().filter_map(|o| o.report()) {
            let record = &device.record;
            let labels = [device.device_id.as_str(), record.model.as_str()];

            if let Some(temp) = record.temperature_celsius {
                self.temperature.with_label_values(&labels).set(i64::from(temp));
            }
            if let Some(hours) = record.power_on_hours {
                self.power_on_hours.with_label_values(&labels).set(saturating_i64(hours));
            }
            if let Some(life) = record.life_remaining_percent {
                self.life_remaining.with_label_values(&labels).set(i64::from(life));
            }

            let counters = [
                ("reallocated", record.reallocated_sector_count),
                ("pending", record.pending_sector_count),
                ("uncorrectable", record.uncorrectable_sector_count),
            ];
            for (counter, value) in counters {
                if let Some(value) = value {
                    self.sectors
                        .with_label_values(&[labels[0], labels[1], counter])
                        .set(saturating_i64(value));
                }
            }

            if record.overall_health != HealthStatus::Unknown {
                let passed = record.overall_health == HealthStatus::Passed;
                self.health_passed.with_label_values(&labels).set(i64::from(passed));
            }

            for severity in [Severity::Warning, Severity::Critical] {
                let count = device.assessment.count(severity);
                let severity = severity.to_string();
                self.findings
                    .with_label_values(&[labels[0], labels[1], severity.as_str()])
                    .set(saturating_i64(count as u64));
            }
        }

        self.devices.set(saturating_i64(report.summary.total_devices as u64));
        self.processing_errors
            .set(saturating_i64(report.summary.processing_errors as u64));
        self.exit_code.set(i64::from(report.exit_code()));
        self.last_run.set(report.generated_at.timestamp());
    }

    /// Encode all gauges in the text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| Error::ReportWrite(format!("Metric encoding failed: {}", e)))?;

        String::from_utf8(buffer).map_err(|e| Error::ReportWrite(e.to_string()))
    }

    /// Write the textfile atomically
    ///
    /// The collector may read the file at any moment, so the content goes
    /// to a sibling temp file first and is renamed into place.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, rendered).map_err(|e| {
            Error::ReportWrite(format!("Cannot write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            Error::ReportWrite(format!("Cannot move metrics into {}: {}", path.display(), e))
        })?;

        debug!("Metrics written to {}", path.display());
        Ok(())
    }
}

/// Export one report to a textfile
pub fn export_textfile(report: &ScanReport, path: &Path) -> Result<()> {
    let exporter = MetricsExporter::new()?;
    exporter.record(report);
    exporter.write_textfile(path)
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
