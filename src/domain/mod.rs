//! Domain layer - Health records, findings and port definitions
//!
//! This module defines the value types shared by extraction, classification
//! and reporting, and the diagnostic source trait that adapters implement.

pub mod ports;

pub use ports::*;
