//! Smart Disk Monitor
//!
//! Command-line entry point. Prints a report framed by the result markers
//! on stdout and exits 0 when every disk is healthy, 1 otherwise.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smart_disk_monitor::hardware::discovery::host;
use smart_disk_monitor::report::{self, OutputFormat, ScanReport, EXIT_PROBLEM};
use smart_disk_monitor::{DiskScanner, HealthClassifier, MonitorConfig, SmartctlRunner};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Smart Disk Monitor - S.M.A.R.T. health check for RMM agents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the smartctl binary
    #[arg(long, env = "SMARTCTL_PATH")]
    smartctl: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, env = "SMART_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Device to check (repeatable); skips `smartctl --scan`
    #[arg(long = "device", value_name = "DEVICE")]
    devices: Vec<String>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write a Prometheus textfile to this path
    #[arg(long, env = "SMART_MONITOR_METRICS_FILE")]
    metrics_file: Option<PathBuf>,

    /// Devices processed concurrently
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Timeout for a single smartctl invocation in seconds
    #[arg(long)]
    command_timeout_secs: Option<u64>,

    /// Exit 1 when any device could not be processed
    #[arg(long, env = "FAIL_ON_DEVICE_ERROR")]
    fail_on_device_error: bool,

    /// Run without checking for administrator privileges
    #[arg(long, env = "SKIP_PRIVILEGE_CHECK")]
    skip_privilege_check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    info!("Starting Smart Disk Monitor");
    info!("  Version: {}", smart_disk_monitor::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => std::process::exit(fail_run(e, args.format.unwrap_or_default())),
    };

    let format = config.report.format;
    let code = match run(&args, config).await {
        Ok(code) => code,
        Err(e) => fail_run(e, format),
    };

    std::process::exit(code);
}

/// Load the configuration file and apply command-line overrides
fn load_config(args: &Args) -> anyhow::Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if args.smartctl.is_some() {
        config.smartctl_path = args.smartctl.clone();
    }
    if !args.devices.is_empty() {
        config.devices = args.devices.clone();
    }
    if let Some(format) = args.format {
        config.report.format = format;
    }
    if args.metrics_file.is_some() {
        config.report.metrics_file = args.metrics_file.clone();
    }
    if let Some(max) = args.max_concurrent {
        config.scanner.max_concurrent_devices = max;
    }
    if let Some(secs) = args.command_timeout_secs {
        config.scanner.command_timeout_secs = secs;
    }
    if args.fail_on_device_error {
        config.report.fail_on_device_error = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Scan every device and print the report; returns the exit code
async fn run(args: &Args, config: MonitorConfig) -> anyhow::Result<i32> {
    if args.skip_privilege_check {
        warn!("Privilege check skipped");
    } else {
        host::require_admin_privileges()?;
    }

    let runner = SmartctlRunner::discover(
        config.smartctl_path.as_deref(),
        Duration::from_secs(config.scanner.command_timeout_secs),
    )?;
    runner.ensure_available().await?;
    info!("  smartctl: {}", runner.binary().display());

    let classifier = HealthClassifier::with_config(config.thresholds.clone());
    let scanner = DiskScanner::new(Arc::new(runner), classifier, config.scanner.clone());

    let devices = scanner
        .enumerate(&config.devices)
        .await
        .context("Device enumeration failed")?;
    let outcomes = scanner.scan(devices).await;

    let scan = ScanReport::new(host::hostname(), outcomes, config.report.fail_on_device_error);
    info!(
        devices = scan.summary.total_devices,
        critical = scan.summary.critical_findings,
        warning = scan.summary.warning_findings,
        errors = scan.summary.processing_errors,
        "Scan complete: {}",
        scan.summary.verdict
    );

    if let Some(path) = &config.report.metrics_file {
        // The textfile is secondary; the stdout verdict still stands
        if let Err(e) = report::export_textfile(&scan, path) {
            error!("Metrics export failed: {}", e);
        }
    }

    let body = report::render(&scan, config.report.format).context("Failed to render report")?;
    print!("{}", report::framed(&body));

    Ok(scan.exit_code())
}

/// Report a run-level failure inside the result markers
fn fail_run(err: anyhow::Error, format: OutputFormat) -> i32 {
    error!("{:#}", err);
    let body = report::render_run_failure(&format!("{:#}", err), format);
    print!("{}", report::framed(&body));
    EXIT_PROBLEM
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the report; logs go to stderr
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
