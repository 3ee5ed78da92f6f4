//! Domain Ports - Core types and trait definitions for the disk monitor
//!
//! These types define the boundary between the parsing/classification core
//! and the external diagnostic utility. Adapters implement
//! [`DiagnosticSource`] to supply raw text for each device.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Health Status
// =============================================================================

/// Overall SMART self-assessment result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Passed,
    /// Failing assessment, keeping the phrase as the device reported it
    Failed(String),
    /// A non-pass phrase reported verbatim by the device
    Other(String),
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Whether this status should be reported as a problem
    pub fn is_problem(&self) -> bool {
        !matches!(self, HealthStatus::Passed | HealthStatus::Unknown)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Passed => write!(f, "PASSED"),
            HealthStatus::Failed(phrase) => write!(f, "{}", phrase),
            HealthStatus::Other(phrase) => write!(f, "{}", phrase),
            HealthStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

// =============================================================================
// Device Health Record
// =============================================================================

/// Structured SMART data for one physical device
///
/// Fields that the device did not report stay `None`. A drive reporting
/// zero reallocated sectors and a drive not reporting the attribute at all
/// are different things.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHealthRecord {
    /// Model name
    pub model: String,
    /// Serial number
    pub serial_number: String,
    /// SSD or NVMe (vs rotating HDD)
    pub is_solid_state: bool,
    /// Overall self-assessment
    pub overall_health: HealthStatus,
    /// Current temperature in Celsius
    pub temperature_celsius: Option<i32>,
    /// Power-on time in hours
    pub power_on_hours: Option<u64>,

    // HDD only
    pub reallocated_sector_count: Option<u64>,
    pub pending_sector_count: Option<u64>,
    pub uncorrectable_sector_count: Option<u64>,

    // SSD only
    pub life_remaining_percent: Option<u8>,
    pub total_bytes_written: Option<u64>,
    pub total_bytes_read: Option<u64>,
}

impl Default for DeviceHealthRecord {
    fn default() -> Self {
        Self {
            model: "Unknown".to_string(),
            serial_number: "Unknown".to_string(),
            is_solid_state: false,
            overall_health: HealthStatus::Unknown,
            temperature_celsius: None,
            power_on_hours: None,
            reallocated_sector_count: None,
            pending_sector_count: None,
            uncorrectable_sector_count: None,
            life_remaining_percent: None,
            total_bytes_written: None,
            total_bytes_read: None,
        }
    }
}

impl DeviceHealthRecord {
    /// Short media label used in reports
    pub fn media_label(&self) -> &'static str {
        if self.is_solid_state {
            "SSD"
        } else {
            "HDD"
        }
    }
}

// =============================================================================
// Findings
// =============================================================================

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Which check produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    HealthStatus,
    Temperature,
    LifeRemaining,
    ReallocatedSectors,
    PendingSectors,
    UncorrectableSectors,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingKind::HealthStatus => write!(f, "health_status"),
            FindingKind::Temperature => write!(f, "temperature"),
            FindingKind::LifeRemaining => write!(f, "life_remaining"),
            FindingKind::ReallocatedSectors => write!(f, "reallocated_sectors"),
            FindingKind::PendingSectors => write!(f, "pending_sectors"),
            FindingKind::UncorrectableSectors => write!(f, "uncorrectable_sectors"),
        }
    }
}

/// A single health issue detected on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub device_id: String,
    pub model: String,
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Disk {} ({}) {}", self.device_id, self.model, self.message)
    }
}

/// Aggregate pass/fail signal for a device or a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Ok,
    Warning,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Warning => write!(f, "WARNING"),
        }
    }
}

/// Classifier output for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Assessment {
    pub findings: Vec<Finding>,
    pub verdict: Verdict,
}

impl Assessment {
    /// Build an assessment; the verdict is Warning whenever any finding exists
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let verdict = if findings.is_empty() {
            Verdict::Ok
        } else {
            Verdict::Warning
        };
        Self { findings, verdict }
    }

    /// Count findings of the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

// =============================================================================
// Diagnostic Source Port
// =============================================================================

/// A device reported by the enumeration step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Device identifier (e.g., /dev/sda)
    pub device_id: String,
    /// Device type hint passed back to smartctl as `-d TYPE`
    pub device_type: Option<String>,
}

impl ScanEntry {
    /// Entry without a device type hint
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            device_type: None,
        }
    }

    /// Name used in reports, findings and metric labels
    ///
    /// Disks behind a RAID controller share one path and are told apart by a
    /// port-qualified type such as `megaraid,1`, so that type is appended.
    pub fn label(&self) -> String {
        match &self.device_type {
            Some(device_type) if device_type.contains(',') => {
                format!("{} [{}]", self.device_id, device_type)
            }
            _ => self.device_id.clone(),
        }
    }
}

/// The three fixed query modes run against every device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Identity block (`-i`)
    Identity,
    /// Health self-assessment (`-H`)
    Health,
    /// Vendor attribute table / NVMe health log (`-A`)
    Attributes,
}

impl QueryMode {
    /// Command-line flag for this mode
    pub fn flag(&self) -> &'static str {
        match self {
            QueryMode::Identity => "-i",
            QueryMode::Health => "-H",
            QueryMode::Attributes => "-A",
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::Identity => write!(f, "identity"),
            QueryMode::Health => write!(f, "health"),
            QueryMode::Attributes => write!(f, "attributes"),
        }
    }
}

/// Port for obtaining raw diagnostic text
#[async_trait]
pub trait DiagnosticSource: Send + Sync {
    /// Enumerate physical devices
    async fn scan_devices(&self) -> Result<Vec<ScanEntry>>;

    /// Run one query against a device and return its raw text output
    async fn query(&self, device: &ScanEntry, mode: QueryMode) -> Result<String>;
}

pub type DiagnosticSourceRef = Arc<dyn DiagnosticSource>;

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            device_id: "/dev/sda".to_string(),
            model: "WDC WD40EFRX".to_string(),
            severity,
            kind: FindingKind::Temperature,
            message: "temperature warning: 52 °C".to_string(),
        }
    }

    #[test]
    fn test_scan_entry_label() {
        assert_eq!(ScanEntry::new("/dev/sda").label(), "/dev/sda");

        let sat = ScanEntry {
            device_id: "/dev/sdb".to_string(),
            device_type: Some("sat".to_string()),
        };
        assert_eq!(sat.label(), "/dev/sdb");

        let raid_member = ScanEntry {
            device_id: "/dev/bus/0".to_string(),
            device_type: Some("megaraid,1".to_string()),
        };
        assert_eq!(raid_member.label(), "/dev/bus/0 [megaraid,1]");
    }

    #[test]
    fn test_health_status_problem() {
        assert!(!HealthStatus::Passed.is_problem());
        assert!(!HealthStatus::Unknown.is_problem());
        assert!(HealthStatus::Failed("FAILED!".into()).is_problem());
        assert!(HealthStatus::Other("FAILING_NOW".into()).is_problem());
    }

    #[test]
    fn test_record_defaults() {
        let record = DeviceHealthRecord::default();
        assert_eq!(record.model, "Unknown");
        assert_eq!(record.serial_number, "Unknown");
        assert_eq!(record.overall_health, HealthStatus::Unknown);
        assert_eq!(record.temperature_celsius, None);
        assert_eq!(record.media_label(), "HDD");
    }

    #[test]
    fn test_assessment_verdict_is_binary() {
        assert_eq!(Assessment::from_findings(vec![]).verdict, Verdict::Ok);

        let warn_only = Assessment::from_findings(vec![finding(Severity::Warning)]);
        assert_eq!(warn_only.verdict, Verdict::Warning);

        let mixed = Assessment::from_findings(vec![
            finding(Severity::Warning),
            finding(Severity::Critical),
        ]);
        assert_eq!(mixed.verdict, Verdict::Warning);
        assert_eq!(mixed.count(Severity::Critical), 1);
    }

    #[test]
    fn test_finding_display() {
        assert_eq!(
            finding(Severity::Warning).to_string(),
            "Disk /dev/sda (WDC WD40EFRX) temperature warning: 52 °C"
        );
    }

    #[test]
    fn test_query_mode_flags() {
        assert_eq!(QueryMode::Identity.flag(), "-i");
        assert_eq!(QueryMode::Health.flag(), "-H");
        assert_eq!(QueryMode::Attributes.flag(), "-A");
    }
}
