//! Hardware Module
//!
//! Provides smartctl discovery, attribute extraction and health
//! classification for locally attached disks.

pub mod discovery;
pub mod extraction;
pub mod classification;

pub use discovery::*;
pub use extraction::*;
pub use classification::*;
