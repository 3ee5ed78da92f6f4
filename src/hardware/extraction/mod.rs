//! Attribute Extraction Module
//!
//! Parses smartctl free-text output (ATA attribute tables, NVMe health
//! logs, SCSI key/value reports) into structured device health records.

pub mod extractor;
pub mod rules;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::*;
pub use rules::{NumericRule, TextRule, NVME_DATA_UNIT_BYTES, SECTOR_SIZE_BYTES};
