//! Error types for the SMART disk monitor
//!
//! Provides structured error types for device enumeration, smartctl
//! invocation, configuration, and report output.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the monitor
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Environment Errors
    // =========================================================================
    #[error("Administrative privileges are required to query SMART data")]
    PrivilegeRequired,

    #[error("smartctl not found (searched: {searched})")]
    SmartctlNotFound { searched: String },

    // =========================================================================
    // Device Errors
    // =========================================================================
    #[error("Device scan failed: {0}")]
    DeviceScan(String),

    #[error("No physical disks detected")]
    NoDevicesDetected,

    #[error("smartctl failed for {device}: {reason}")]
    SmartctlCommand { device: String, reason: String },

    #[error("smartctl timed out for {device} after {timeout:?}")]
    CommandTimeout { device: String, timeout: Duration },

    #[error("Processing failed for {device}: {reason}")]
    DeviceTaskFailed { device: String, reason: String },

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("Report write failed: {0}")]
    ReportWrite(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// How far the damage of an error reaches during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Only the device being processed is affected; the scan continues
    Device,
    /// The whole run is aborted and reported as failed
    Run,
}

impl Error {
    /// Determine the scope of this error
    pub fn scope(&self) -> ErrorScope {
        match self {
            Error::SmartctlCommand { .. }
            | Error::CommandTimeout { .. }
            | Error::DeviceTaskFailed { .. } => ErrorScope::Device,

            Error::Internal(_)
            | Error::Configuration(_)
            | Error::PrivilegeRequired
            | Error::SmartctlNotFound { .. }
            | Error::DeviceScan(_)
            | Error::NoDevicesDetected
            | Error::ReportWrite(_)
            | Error::JsonParse(_)
            | Error::YamlParse(_) => ErrorScope::Run,
        }
    }

    /// Check if this error is isolated to a single device
    pub fn is_device_scoped(&self) -> bool {
        self.scope() == ErrorScope::Device
    }
}

/// Result type alias for the monitor
pub type Result<T> = std::result::Result<T, Error>;
