//! Disk Scanner
//!
//! Drives a full scan: enumerates devices, fetches the three text blocks
//! per device, extracts and classifies them. Devices are processed
//! concurrently and each one is isolated, so a failure on one device is
//! reported for that device while the others complete normally.

use crate::domain::ports::{
    Assessment, DeviceHealthRecord, DiagnosticSourceRef, QueryMode, ScanEntry,
};
use crate::error::{Error, Result};
use crate::hardware::classification::HealthClassifier;
use crate::hardware::extraction::AttributeExtractor;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

// =============================================================================
// Scanner Configuration
// =============================================================================

/// Configuration for the disk scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Devices processed at the same time
    pub max_concurrent_devices: usize,
    /// Timeout for one smartctl invocation (seconds)
    pub command_timeout_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_devices: 4,
            command_timeout_secs: 60,
        }
    }
}

// =============================================================================
// Scan Results
// =============================================================================

/// Extracted record and classification for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub device_id: String,
    pub record: DeviceHealthRecord,
    pub assessment: Assessment,
}

/// Result of processing one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceOutcome {
    /// Data was collected and classified
    Assessed(DeviceReport),
    /// Processing failed; no findings exist for this device
    Failed { device_id: String, reason: String },
}

impl DeviceOutcome {
    pub fn device_id(&self) -> &str {
        match self {
            DeviceOutcome::Assessed(report) => &report.device_id,
            DeviceOutcome::Failed { device_id, .. } => device_id,
        }
    }

    pub fn report(&self) -> Option<&DeviceReport> {
        match self {
            DeviceOutcome::Assessed(report) => Some(report),
            DeviceOutcome::Failed { .. } => None,
        }
    }
}

// =============================================================================
// Disk Scanner
// =============================================================================

/// Scans devices through a diagnostic source
pub struct DiskScanner {
    source: DiagnosticSourceRef,
    classifier: Arc<HealthClassifier>,
    config: ScannerConfig,
}

impl DiskScanner {
    /// Create a new scanner
    pub fn new(source: DiagnosticSourceRef, classifier: HealthClassifier, config: ScannerConfig) -> Self {
        Self {
            source,
            classifier: Arc::new(classifier),
            config,
        }
    }

    /// Resolve the devices to scan
    ///
    /// Explicitly configured devices skip enumeration.
    pub async fn enumerate(&self, explicit: &[String]) -> Result<Vec<ScanEntry>> {
        let devices = if explicit.is_empty() {
            self.source.scan_devices().await?
        } else {
            explicit.iter().map(ScanEntry::new).collect()
        };

        if devices.is_empty() {
            return Err(Error::NoDevicesDetected);
        }

        info!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Process every device; results come back in the order given
    pub async fn scan(&self, devices: Vec<ScanEntry>) -> Vec<DeviceOutcome> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_devices.max(1)));

        let (ids, handles): (Vec<_>, Vec<_>) = devices
            .into_iter()
            .map(|device| {
                let source = self.source.clone();
                let classifier = self.classifier.clone();
                let permits = permits.clone();
                let device_id = device.label();

                let handle = tokio::spawn(async move {
                    // The semaphore is never closed, so acquisition cannot fail
                    let _permit = permits.acquire_owned().await;
                    Self::assess_device(source, &classifier, &device).await
                });

                (device_id, handle)
            })
            .unzip();

        let results = join_all(handles).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (device_id, result) in ids.into_iter().zip(results) {
            let outcome = match result {
                Ok(Ok(report)) => DeviceOutcome::Assessed(report),
                Ok(Err(e)) => {
                    if e.is_device_scoped() {
                        warn!("Processing failed for {}: {}", device_id, e);
                    } else {
                        error!("Unexpected failure on {}: {}", device_id, e);
                    }
                    DeviceOutcome::Failed {
                        device_id,
                        reason: e.to_string(),
                    }
                }
                Err(join_err) => {
                    let err = Error::DeviceTaskFailed {
                        device: device_id.clone(),
                        reason: if join_err.is_panic() {
                            "panicked during processing".to_string()
                        } else {
                            "task cancelled".to_string()
                        },
                    };
                    warn!("{}", err);
                    DeviceOutcome::Failed {
                        device_id,
                        reason: err.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Fetch, extract and classify a single device
    async fn assess_device(
        source: DiagnosticSourceRef,
        classifier: &HealthClassifier,
        device: &ScanEntry,
    ) -> Result<DeviceReport> {
        let label = device.label();
        debug!("Processing disk: {}", label);

        let identity = source.query(device, QueryMode::Identity).await?;
        let health = source.query(device, QueryMode::Health).await?;
        let attributes = source.query(device, QueryMode::Attributes).await?;

        let record = AttributeExtractor::extract(&identity, &health, &attributes);
        let assessment = classifier.classify(&label, &record);

        Ok(DeviceReport {
            device_id: label,
            record,
            assessment,
        })
    }
}
