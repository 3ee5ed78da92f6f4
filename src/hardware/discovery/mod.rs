//! Device Discovery Module
//!
//! Locates smartctl, enumerates physical disks and collects their SMART
//! output for extraction and classification.

pub mod host;
pub mod scanner;
pub mod smartctl;

pub use scanner::*;
pub use smartctl::*;
