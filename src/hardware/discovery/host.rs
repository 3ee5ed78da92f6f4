//! Host Environment
//!
//! Privilege and hostname lookups needed before and during a scan.

use crate::error::{Error, Result};
use std::fs;
use tracing::debug;

/// Check whether the process can issue SMART queries to raw devices
#[cfg(unix)]
pub fn has_admin_privileges() -> bool {
    nix::unistd::Uid::effective().is_root()
}

/// Privileges cannot be checked portably here; smartctl reports denied
/// access itself.
#[cfg(not(unix))]
pub fn has_admin_privileges() -> bool {
    true
}

/// Fail the run early when privileges are missing
pub fn require_admin_privileges() -> Result<()> {
    if has_admin_privileges() {
        Ok(())
    } else {
        Err(Error::PrivilegeRequired)
    }
}

/// Get the system hostname
pub fn hostname() -> String {
    // Try /etc/hostname first
    if let Ok(hostname) = fs::read_to_string("/etc/hostname") {
        let trimmed = hostname.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // Windows exposes the name through the environment
    if let Ok(name) = std::env::var("COMPUTERNAME") {
        return name;
    }

    // Fall back to hostname command
    if let Ok(output) = std::process::Command::new("hostname").output() {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }

    debug!("Hostname lookup failed");
    "unknown".to_string()
}
