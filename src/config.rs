//! Monitor Configuration
//!
//! Optional YAML file merged under the command line. Every section has
//! defaults, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use crate::hardware::classification::ClassifierConfig;
use crate::hardware::discovery::ScannerConfig;
use crate::report::ReportConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// smartctl binary; located automatically when unset
    pub smartctl_path: Option<PathBuf>,
    /// Devices to check instead of running `smartctl --scan`
    pub devices: Vec<String>,
    pub thresholds: ClassifierConfig,
    pub scanner: ScannerConfig,
    pub report: ReportConfig,
}

impl MonitorConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        if self.scanner.max_concurrent_devices == 0 {
            return Err(Error::Configuration(
                "scanner.max_concurrent_devices must be at least 1".to_string(),
            ));
        }
        if self.scanner.command_timeout_secs == 0 {
            return Err(Error::Configuration(
                "scanner.command_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
