//! smartctl Adapter
//!
//! Locates the smartctl binary from smartmontools, enumerates devices with
//! `--scan` and runs the identity, health and attribute queries against
//! each device.

use crate::domain::ports::{DiagnosticSource, QueryMode, ScanEntry};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

// =============================================================================
// Constants
// =============================================================================

#[cfg(windows)]
const SMARTCTL_BINARY: &str = "smartctl.exe";
#[cfg(not(windows))]
const SMARTCTL_BINARY: &str = "smartctl";

/// Install locations checked when smartctl is not on PATH
const WELL_KNOWN_DIRS: &[&str] = &[
    "/usr/sbin",
    "/usr/local/sbin",
    "/usr/bin",
    "/opt/homebrew/bin",
    r"C:\Program Files\smartmontools\bin",
];

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// smartctl Runner
// =============================================================================

/// Runs smartctl as a child process
#[derive(Debug, Clone)]
pub struct SmartctlRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl SmartctlRunner {
    /// Create a runner for a known binary path
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Locate smartctl and create a runner for it
    pub fn discover(explicit: Option<&Path>, timeout: Duration) -> Result<Self> {
        let binary = Self::locate(explicit)?;
        debug!("Using smartctl at {}", binary.display());
        Ok(Self::new(binary, timeout))
    }

    /// Find the smartctl binary
    ///
    /// An explicit path must exist. Otherwise PATH is searched, then the
    /// usual install directories.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(Error::SmartctlNotFound {
                searched: path.display().to_string(),
            });
        }

        let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();

        let candidates: Vec<PathBuf> = path_dirs
            .into_iter()
            .chain(WELL_KNOWN_DIRS.iter().map(PathBuf::from))
            .map(|dir| dir.join(SMARTCTL_BINARY))
            .collect();

        candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .cloned()
            .ok_or_else(|| Error::SmartctlNotFound {
                searched: candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check if the binary runs
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Fail when the located binary does not run
    pub async fn ensure_available(&self) -> Result<()> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(Error::SmartctlNotFound {
                searched: format!("{} (does not run)", self.binary.display()),
            })
        }
    }

    /// Parse `smartctl --scan` output
    ///
    /// Each device line looks like `/dev/sda -d sat # /dev/sda [SAT], ATA
    /// device`. Comment lines and duplicates are skipped. Disks behind a RAID
    /// controller share a path, so an entry is a duplicate only when both the
    /// path and the type repeat.
    pub fn parse_scan(output: &str) -> Vec<ScanEntry> {
        let mut entries: Vec<ScanEntry> = Vec::new();

        for line in output.lines() {
            let command_part = line.split('#').next().unwrap_or_default();
            let tokens: Vec<&str> = command_part.split_whitespace().collect();

            let device_id = match tokens.first() {
                Some(first) if first.contains("/dev/") => first.to_string(),
                _ => continue,
            };

            let device_type = tokens
                .iter()
                .position(|t| *t == "-d")
                .and_then(|idx| tokens.get(idx + 1))
                .map(|t| t.to_string());

            let entry = ScanEntry {
                device_id,
                device_type,
            };
            if entries.contains(&entry) {
                continue;
            }

            entries.push(entry);
        }

        entries
    }

    /// Arguments for one query
    fn query_args(device: &ScanEntry, mode: QueryMode) -> Vec<String> {
        let mut args = vec![mode.flag().to_string()];
        if let Some(device_type) = &device.device_type {
            args.push("-d".to_string());
            args.push(device_type.clone());
        }
        args.push(device.device_id.clone());
        args
    }

    /// Run smartctl and return stdout followed by stderr
    ///
    /// smartctl's exit status is a bitmask that is nonzero for many
    /// healthy-but-noteworthy conditions, so it is not treated as failure.
    async fn run(&self, label: &str, args: &[String]) -> Result<String> {
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let child = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| Error::CommandTimeout {
                device: label.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|e| Error::SmartctlCommand {
                device: label.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(code) = output.status.code() {
            if code & 0b11 != 0 {
                warn!(
                    device = label,
                    exit_code = code,
                    "smartctl reported a command line or device open problem"
                );
            }
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[async_trait]
impl DiagnosticSource for SmartctlRunner {
    async fn scan_devices(&self) -> Result<Vec<ScanEntry>> {
        let output = self
            .run("--scan", &["--scan".to_string()])
            .await
            .map_err(|e| Error::DeviceScan(e.to_string()))?;

        Ok(Self::parse_scan(&output))
    }

    async fn query(&self, device: &ScanEntry, mode: QueryMode) -> Result<String> {
        let args = Self::query_args(device, mode);
        self.run(&device.label(), &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::extraction::fixtures::SCAN_OUTPUT;

    #[test]
    fn test_parse_scan() {
        let entries = SmartctlRunner::parse_scan(SCAN_OUTPUT);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].device_id, "/dev/sda");
        assert_eq!(entries[0].device_type.as_deref(), Some("scsi"));
        assert_eq!(entries[1].device_id, "/dev/sdb");
        assert_eq!(entries[1].device_type.as_deref(), Some("sat"));
        assert_eq!(entries[2].device_id, "/dev/nvme0");
    }

    #[test]
    fn test_parse_scan_skips_noise_and_duplicates() {
        let output = "# /dev/sdz commented out\n\n/dev/sda\n/dev/sda -d sat\nsmartctl: warning\n";
        let entries = SmartctlRunner::parse_scan(output);

        assert_eq!(entries, vec![ScanEntry::new("/dev/sda")]);
    }

    #[test]
    fn test_parse_scan_keeps_raid_members() {
        let output = "\
/dev/bus/0 -d megaraid,0 # /dev/bus/0 [megaraid_disk_00], SCSI device
/dev/bus/0 -d megaraid,1 # /dev/bus/0 [megaraid_disk_01], SCSI device
/dev/bus/0 -d megaraid,1 # /dev/bus/0 [megaraid_disk_01], SCSI device
";
        let entries = SmartctlRunner::parse_scan(output);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].device_type.as_deref(), Some("megaraid,0"));
        assert_eq!(entries[1].device_type.as_deref(), Some("megaraid,1"));

        let labels: Vec<_> = entries.iter().map(ScanEntry::label).collect();
        assert_eq!(labels, vec!["/dev/bus/0 [megaraid,0]", "/dev/bus/0 [megaraid,1]"]);
    }

    #[test]
    fn test_query_args() {
        let typed = ScanEntry {
            device_id: "/dev/sdb".to_string(),
            device_type: Some("sat".to_string()),
        };
        assert_eq!(
            SmartctlRunner::query_args(&typed, QueryMode::Attributes),
            vec!["-A", "-d", "sat", "/dev/sdb"]
        );

        let plain = ScanEntry::new("/dev/sda");
        assert_eq!(
            SmartctlRunner::query_args(&plain, QueryMode::Identity),
            vec!["-i", "/dev/sda"]
        );
    }

    #[test]
    fn test_locate_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join(SMARTCTL_BINARY);
        std::fs::write(&binary, b"").unwrap();

        assert_eq!(SmartctlRunner::locate(Some(&binary)).unwrap(), binary);

        let missing = dir.path().join("missing-smartctl");
        let err = SmartctlRunner::locate(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::SmartctlNotFound { .. }));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let runner = SmartctlRunner::new("/nonexistent/smartctl", DEFAULT_COMMAND_TIMEOUT);
        assert!(!tokio_test::block_on(runner.is_available()));

        let err = tokio_test::block_on(runner.ensure_available()).unwrap_err();
        assert!(matches!(err, Error::SmartctlNotFound { .. }));
    }
}
