//! Health Classifier
//!
//! Evaluates a device health record against temperature, wear and
//! sector-count thresholds and produces findings plus a verdict.

use crate::domain::ports::{Assessment, DeviceHealthRecord, Finding, FindingKind, Severity};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Classifier Configuration
// =============================================================================

/// Thresholds used by the health classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Temperature at or above this is a warning (Celsius)
    pub temperature_warning_celsius: i32,
    /// Temperature at or above this is critical (Celsius)
    pub temperature_critical_celsius: i32,

    /// SSD life remaining at or below this is a warning (percent)
    pub life_warning_percent: u8,
    /// SSD life remaining at or below this is critical (percent)
    pub life_critical_percent: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature_warning_celsius: 50,
            temperature_critical_celsius: 60,

            life_warning_percent: 20,
            life_critical_percent: 10,
        }
    }
}

impl ClassifierConfig {
    /// Reject threshold pairs that would make a severity band unreachable
    pub fn validate(&self) -> Result<()> {
        if self.temperature_warning_celsius >= self.temperature_critical_celsius {
            return Err(Error::Configuration(format!(
                "temperature warning threshold ({}) must be below critical ({})",
                self.temperature_warning_celsius, self.temperature_critical_celsius
            )));
        }

        if self.life_warning_percent <= self.life_critical_percent {
            return Err(Error::Configuration(format!(
                "life warning threshold ({}%) must be above critical ({}%)",
                self.life_warning_percent, self.life_critical_percent
            )));
        }

        if self.life_warning_percent > 100 {
            return Err(Error::Configuration(format!(
                "life warning threshold ({}%) exceeds 100%",
                self.life_warning_percent
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Health Classifier
// =============================================================================

/// Classifies device health records into findings
#[derive(Debug, Clone, Default)]
pub struct HealthClassifier {
    config: ClassifierConfig,
}

impl HealthClassifier {
    /// Create a new classifier with default thresholds
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    /// Create a classifier with custom thresholds
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a device record
    ///
    /// Every rule is evaluated independently, so one record may produce
    /// several findings. The verdict is Warning whenever any finding exists.
    pub fn classify(&self, device_id: &str, record: &DeviceHealthRecord) -> Assessment {
        let mut findings = Vec::new();
        let mut emit = |severity: Severity, kind: FindingKind, message: String| {
            findings.push(Finding {
                device_id: device_id.to_string(),
                model: record.model.clone(),
                severity,
                kind,
                message,
            });
        };

        if let Some((severity, message)) = self.check_health_status(record) {
            emit(severity, FindingKind::HealthStatus, message);
        }

        if let Some((severity, message)) = self.check_temperature(record) {
            emit(severity, FindingKind::Temperature, message);
        }

        if record.is_solid_state {
            if let Some((severity, message)) = self.check_life_remaining(record) {
                emit(severity, FindingKind::LifeRemaining, message);
            }
        } else {
            for (kind, message) in self.check_sector_counters(record) {
                emit(Severity::Critical, kind, message);
            }
        }

        let assessment = Assessment::from_findings(findings);
        debug!(
            device = device_id,
            findings = assessment.findings.len(),
            verdict = %assessment.verdict,
            "classified device"
        );
        assessment
    }

    /// Any non-pass self-assessment is critical
    fn check_health_status(&self, record: &DeviceHealthRecord) -> Option<(Severity, String)> {
        if record.overall_health.is_problem() {
            Some((
                Severity::Critical,
                format!("health status: {}", record.overall_health),
            ))
        } else {
            None
        }
    }

    fn check_temperature(&self, record: &DeviceHealthRecord) -> Option<(Severity, String)> {
        let celsius = record.temperature_celsius?;

        if celsius >= self.config.temperature_critical_celsius {
            Some((Severity::Critical, format!("temperature critical: {} °C", celsius)))
        } else if celsius >= self.config.temperature_warning_celsius {
            Some((Severity::Warning, format!("temperature warning: {} °C", celsius)))
        } else {
            None
        }
    }

    fn check_life_remaining(&self, record: &DeviceHealthRecord) -> Option<(Severity, String)> {
        let percent = record.life_remaining_percent?;

        if percent <= self.config.life_critical_percent {
            Some((Severity::Critical, format!("SSD life critically low: {}%", percent)))
        } else if percent <= self.config.life_warning_percent {
            Some((Severity::Warning, format!("SSD life warning: {}%", percent)))
        } else {
            None
        }
    }

    /// One finding per nonzero counter; unset counters are not evidence
    fn check_sector_counters(&self, record: &DeviceHealthRecord) -> Vec<(FindingKind, String)> {
        [
            (
                FindingKind::ReallocatedSectors,
                record.reallocated_sector_count,
                "reallocated",
            ),
            (
                FindingKind::PendingSectors,
                record.pending_sector_count,
                "pending",
            ),
            (
                FindingKind::UncorrectableSectors,
                record.uncorrectable_sector_count,
                "uncorrectable",
            ),
        ]
        .into_iter()
        .filter_map(|(kind, count, label)| match count {
            Some(n) if n > 0 => Some((kind, format!("has {} {} sectors", n, label))),
            _ => None,
        })
        .collect()
    }
}
