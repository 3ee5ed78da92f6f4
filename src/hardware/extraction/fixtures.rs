//! Captured smartctl output used by unit tests.

pub const ATA_HDD_IDENTITY: &str = include_str!("../../../tests/fixtures/ata_hdd_identity.txt");
pub const ATA_HDD_ATTRIBUTES: &str = include_str!("../../../tests/fixtures/ata_hdd_attributes.txt");
pub const ATA_PASSED_HEALTH: &str = include_str!("../../../tests/fixtures/ata_passed_health.txt");

pub const ATA_MSEC_ATTRIBUTES: &str = include_str!("../../../tests/fixtures/ata_msec_attributes.txt");
pub const ATA_SSD_IDENTITY: &str = include_str!("../../../tests/fixtures/ata_ssd_identity.txt");
pub const ATA_SSD_ATTRIBUTES: &str = include_str!("../../../tests/fixtures/ata_ssd_attributes.txt");

pub const NVME_IDENTITY: &str = include_str!("../../../tests/fixtures/nvme_identity.txt");
pub const NVME_HEALTH: &str = include_str!("../../../tests/fixtures/nvme_health.txt");
pub const NVME_ATTRIBUTES: &str = include_str!("../../../tests/fixtures/nvme_attributes.txt");

pub const SCSI_IDENTITY: &str = include_str!("../../../tests/fixtures/scsi_identity.txt");
pub const SCSI_HEALTH: &str = include_str!("../../../tests/fixtures/scsi_health.txt");
pub const SCSI_ATTRIBUTES: &str = include_str!("../../../tests/fixtures/scsi_attributes.txt");

pub const SCAN_OUTPUT: &str = include_str!("../../../tests/fixtures/scan.txt");
