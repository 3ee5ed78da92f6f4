//! Hardware Classification Module
//!
//! Classifies device health records into findings and an OK / WARNING
//! verdict.

pub mod classifier;

pub use classifier::*;
