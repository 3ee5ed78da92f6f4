//! Scan Summary
//!
//! Aggregates per-device outcomes into run totals, the run verdict and the
//! process exit code handed back to the monitoring agent.

use crate::domain::ports::{Finding, Severity, Verdict};
use crate::hardware::discovery::DeviceOutcome;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// All devices healthy
pub const EXIT_OK: i32 = 0;
/// Any finding, or a run-level failure
pub const EXIT_PROBLEM: i32 = 1;

/// Totals for one scan run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_devices: usize,
    pub assessed_devices: usize,
    pub processing_errors: usize,
    pub critical_findings: usize,
    pub warning_findings: usize,
    pub verdict: Verdict,
    pub exit_code: i32,
}

impl ScanSummary {
    /// Summarize outcomes
    ///
    /// The verdict only reflects devices that produced data. Processing
    /// errors change the exit code only when `fail_on_device_error` is set.
    pub fn from_outcomes(outcomes: &[DeviceOutcome], fail_on_device_error: bool) -> Self {
        let reports: Vec<_> = outcomes.iter().filter_map(DeviceOutcome::report).collect();

        let critical_findings = reports
            .iter()
            .map(|r| r.assessment.count(Severity::Critical))
            .sum();
        let warning_findings = reports
            .iter()
            .map(|r| r.assessment.count(Severity::Warning))
            .sum();

        let verdict = if reports.iter().any(|r| r.assessment.verdict == Verdict::Warning) {
            Verdict::Warning
        } else {
            Verdict::Ok
        };

        let processing_errors = outcomes.len() - reports.len();
        let exit_code = if verdict == Verdict::Warning || (fail_on_device_error && processing_errors > 0) {
            EXIT_PROBLEM
        } else {
            EXIT_OK
        };

        Self {
            total_devices: outcomes.len(),
            assessed_devices: reports.len(),
            processing_errors,
            critical_findings,
            warning_findings,
            verdict,
            exit_code,
        }
    }
}

/// Everything produced by one scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Local>,
    pub hostname: String,
    pub devices: Vec<DeviceOutcome>,
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn new(hostname: String, devices: Vec<DeviceOutcome>, fail_on_device_error: bool) -> Self {
        let summary = ScanSummary::from_outcomes(&devices, fail_on_device_error);
        Self {
            generated_at: Local::now(),
            hostname,
            devices,
            summary,
        }
    }

    /// Every finding across all assessed devices, in device order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.devices
            .iter()
            .filter_map(DeviceOutcome::report)
            .flat_map(|r| r.assessment.findings.iter())
    }

    pub fn exit_code(&self) -> i32 {
        self.summary.exit_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Assessment, DeviceHealthRecord, FindingKind};
    use crate::hardware::discovery::DeviceReport;

    fn assessed(device_id: &str, severities: &[Severity]) -> DeviceOutcome {
        let findings = severities
            .iter()
            .map(|severity| Finding {
                device_id: device_id.to_string(),
                model: "Test Disk".to_string(),
                severity: *severity,
                kind: FindingKind::Temperature,
                message: "temperature warning: 55 °C".to_string(),
            })
            .collect();

        DeviceOutcome::Assessed(DeviceReport {
            device_id: device_id.to_string(),
            record: DeviceHealthRecord::default(),
            assessment: Assessment::from_findings(findings),
        })
    }

    fn failed(device_id: &str) -> DeviceOutcome {
        DeviceOutcome::Failed {
            device_id: device_id.to_string(),
            reason: "smartctl timed out".to_string(),
        }
    }

    #[test]
    fn test_all_healthy() {
        let summary = ScanSummary::from_outcomes(&[assessed("/dev/sda", &[]), assessed("/dev/sdb", &[])], false);

        assert_eq!(summary.total_devices, 2);
        assert_eq!(summary.verdict, Verdict::Ok);
        assert_eq!(summary.exit_code, EXIT_OK);
    }

    #[test]
    fn test_counts_findings_by_severity() {
        let summary = ScanSummary::from_outcomes(
            &[
                assessed("/dev/sda", &[Severity::Critical, Severity::Warning]),
                assessed("/dev/sdb", &[Severity::Warning]),
            ],
            false,
        );

        assert_eq!(summary.critical_findings, 1);
        assert_eq!(summary.warning_findings, 2);
        assert_eq!(summary.verdict, Verdict::Warning);
        assert_eq!(summary.exit_code, EXIT_PROBLEM);
    }

    #[test]
    fn test_processing_error_does_not_taint_verdict() {
        let outcomes = [assessed("/dev/sda", &[]), failed("/dev/sdb"), assessed("/dev/sdc", &[])];

        let summary = ScanSummary::from_outcomes(&outcomes, false);
        assert_eq!(summary.assessed_devices, 2);
        assert_eq!(summary.processing_errors, 1);
        assert_eq!(summary.verdict, Verdict::Ok);
        assert_eq!(summary.exit_code, EXIT_OK);

        let strict = ScanSummary::from_outcomes(&outcomes, true);
        assert_eq!(strict.verdict, Verdict::Ok);
        assert_eq!(strict.exit_code, EXIT_PROBLEM);
    }

    #[test]
    fn test_report_findings_in_device_order() {
        let report = ScanReport::new(
            "host".to_string(),
            vec![
                assessed("/dev/sda", &[Severity::Warning]),
                failed("/dev/sdb"),
                assessed("/dev/sdc", &[Severity::Critical]),
            ],
            false,
        );

        let devices: Vec<_> = report.findings().map(|f| f.device_id.as_str()).collect();
        assert_eq!(devices, vec!["/dev/sda", "/dev/sdc"]);
        assert_eq!(report.exit_code(), EXIT_PROBLEM);
    }
}
