//! Smart Disk Monitor - S.M.A.R.T. Health Check
//!
//! Runs smartctl against every disk on the host, extracts a normalized
//! health record from its text output, classifies the record against
//! thresholds and reports an OK / WARNING verdict for an RMM agent.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          Disk Scanner                         │
//! │   enumerate ──► per-device task (semaphore-bounded, isolated) │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌─────────────┐  │
//! │  │ DiagnosticSource │  │    Attribute     │  │   Health    │  │
//! │  │   (smartctl)     │─►│    Extractor     │─►│ Classifier  │  │
//! │  └──────────────────┘  └──────────────────┘  └─────────────┘  │
//! ├───────────────────────────────────────────────────────────────┤
//! │          Reporting: text / JSON / Prometheus textfile         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`hardware`]: smartctl discovery, attribute extraction and classification
//! - [`report`]: run summary and output rendering
//! - [`config`]: YAML configuration
//! - [`domain`]: Core domain types and the diagnostic source port
//! - [`error`]: Error types and handling

pub mod config;
pub mod domain;
pub mod error;
pub mod hardware;
pub mod report;

// Re-export commonly used types
pub use config::MonitorConfig;

pub use domain::ports::{
    Assessment, DeviceHealthRecord, DiagnosticSource, DiagnosticSourceRef,
    Finding, FindingKind, HealthStatus, QueryMode, ScanEntry, Severity, Verdict,
};

pub use error::{Error, ErrorScope, Result};

pub use hardware::{
    AttributeExtractor,
    ClassifierConfig, HealthClassifier,
    DeviceOutcome, DeviceReport, DiskScanner, ScannerConfig, SmartctlRunner,
};

pub use report::{OutputFormat, ReportConfig, ScanReport, ScanSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
