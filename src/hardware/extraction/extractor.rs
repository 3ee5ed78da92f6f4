//! Attribute Extractor
//!
//! Turns the three raw smartctl text blocks of one device (identity, health,
//! attribute table) into a [`DeviceHealthRecord`]. Extraction never fails:
//! anything that cannot be matched or parsed is left unset.

use super::rules;
use crate::domain::ports::{DeviceHealthRecord, HealthStatus};
use tracing::debug;

/// Attribute extraction over smartctl free-text output
pub struct AttributeExtractor;

impl AttributeExtractor {
    /// Build a health record from the identity, health and attribute blocks
    pub fn extract(identity_text: &str, health_text: &str, attribute_text: &str) -> DeviceHealthRecord {
        let model = Self::extract_model(identity_text);
        let serial_number = Self::extract_serial(identity_text);
        let is_solid_state = Self::is_solid_state(identity_text, model.as_deref());

        let mut record = DeviceHealthRecord {
            model: model.unwrap_or_else(|| "Unknown".to_string()),
            serial_number: serial_number.unwrap_or_else(|| "Unknown".to_string()),
            is_solid_state,
            overall_health: Self::extract_health(health_text),
            temperature_celsius: Self::extract_temperature(attribute_text),
            power_on_hours: rules::first_value(&rules::POWER_ON_RULES, attribute_text),
            ..DeviceHealthRecord::default()
        };

        if is_solid_state {
            record.life_remaining_percent = Self::extract_life_remaining(attribute_text);
            record.total_bytes_written =
                rules::first_value(&rules::BYTES_WRITTEN_RULES, attribute_text);
            record.total_bytes_read = rules::first_value(&rules::BYTES_READ_RULES, attribute_text);
        } else {
            record.reallocated_sector_count =
                rules::first_value(&rules::REALLOCATED_RULES, attribute_text);
            record.pending_sector_count = rules::first_value(&rules::PENDING_RULES, attribute_text);
            record.uncorrectable_sector_count =
                rules::first_value(&rules::UNCORRECTABLE_RULES, attribute_text);
        }

        debug!(
            model = %record.model,
            ssd = record.is_solid_state,
            health = %record.overall_health,
            "extracted device record"
        );

        record
    }

    /// Model name from the first matching vendor phrasing
    pub fn extract_model(identity_text: &str) -> Option<String> {
        rules::first_text(&rules::MODEL_RULES, identity_text).map(|(_, v)| v.to_string())
    }

    pub fn extract_serial(identity_text: &str) -> Option<String> {
        rules::first_text(&rules::SERIAL_RULES, identity_text).map(|(_, v)| v.to_string())
    }

    /// Solid-state detection from identity markers or an SSD model name
    pub fn is_solid_state(identity_text: &str, model: Option<&str>) -> bool {
        rules::SOLID_STATE_MARKERS.is_match(identity_text)
            || model.map(|m| m.contains("SSD")).unwrap_or(false)
    }

    /// Overall health: ATA self-assessment, SCSI status, then NVMe health log
    pub fn extract_health(health_text: &str) -> HealthStatus {
        if let Some(phrase) = rules::ATA_HEALTH_RULE.capture(health_text) {
            return Self::health_from_phrase(phrase);
        }

        if let Some(status) = rules::SCSI_HEALTH_RULE.capture(health_text) {
            return if status.eq_ignore_ascii_case("OK") {
                HealthStatus::Passed
            } else {
                HealthStatus::Other(status.to_string())
            };
        }

        Self::nvme_health(health_text).unwrap_or_default()
    }

    fn health_from_phrase(phrase: &str) -> HealthStatus {
        if phrase == "PASSED" {
            HealthStatus::Passed
        } else if phrase.starts_with("FAILED") {
            HealthStatus::Failed(phrase.to_string())
        } else {
            HealthStatus::Other(phrase.to_string())
        }
    }

    /// Search a bounded window after the NVMe health header for a verdict word
    fn nvme_health(health_text: &str) -> Option<HealthStatus> {
        let header = rules::NVME_HEALTH_HEADER.find(health_text)?;
        let window: String = health_text[header.end()..]
            .lines()
            .take(rules::NVME_HEALTH_WINDOW_LINES + 1)
            .collect::<Vec<_>>()
            .join("\n");

        let word = rules::NVME_HEALTH_WORD.captures(&window)?.get(1)?.as_str();
        if word.eq_ignore_ascii_case("normal") {
            Some(HealthStatus::Passed)
        } else {
            Some(HealthStatus::Failed(word.to_string()))
        }
    }

    pub fn extract_temperature(attribute_text: &str) -> Option<i32> {
        let celsius = rules::first_value(&rules::TEMPERATURE_RULES, attribute_text)?;
        i32::try_from(celsius).ok()
    }

    /// SSD life remaining; the wearout indicator and NVMe variants are inverted
    pub fn extract_life_remaining(attribute_text: &str) -> Option<u8> {
        let percent = rules::first_value(&rules::LIFE_REMAINING_RULES, attribute_text)?;
        u8::try_from(percent.min(100)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::extraction::fixtures::*;

    const TIB: u64 = 1024 * 1024 * 1024 * 1024;

    #[test]
    fn test_extract_ata_hdd() {
        let record = AttributeExtractor::extract(ATA_HDD_IDENTITY, ATA_PASSED_HEALTH, ATA_HDD_ATTRIBUTES);

        assert_eq!(record.model, "WDC WD40EFRX-68N32N0");
        assert_eq!(record.serial_number, "WD-WCC7K1234567");
        assert!(!record.is_solid_state);
        assert_eq!(record.overall_health, HealthStatus::Passed);
        assert_eq!(record.temperature_celsius, Some(36));
        assert_eq!(record.power_on_hours, Some(28123));
        assert_eq!(record.reallocated_sector_count, Some(8));
        assert_eq!(record.pending_sector_count, Some(0));
        assert_eq!(record.uncorrectable_sector_count, Some(0));

        // SSD-only fields stay unset on rotating media
        assert_eq!(record.life_remaining_percent, None);
        assert_eq!(record.total_bytes_written, None);
        assert_eq!(record.total_bytes_read, None);
    }

    #[test]
    fn test_extract_ata_ssd() {
        let record = AttributeExtractor::extract(ATA_SSD_IDENTITY, ATA_PASSED_HEALTH, ATA_SSD_ATTRIBUTES);

        assert_eq!(record.model, "Samsung SSD 860 EVO 500GB");
        assert!(record.is_solid_state);
        assert_eq!(record.temperature_celsius, Some(31));
        assert_eq!(record.power_on_hours, Some(15020));
        // Samsung reports erase cycles in RAW; 136 clamps to 100
        assert_eq!(record.life_remaining_percent, Some(100));
        assert_eq!(record.total_bytes_written, Some(2 * TIB));
        assert_eq!(record.total_bytes_read, Some(TIB));

        // HDD-only fields stay unset on solid-state media
        assert_eq!(record.reallocated_sector_count, None);
        assert_eq!(record.pending_sector_count, None);
        assert_eq!(record.uncorrectable_sector_count, None);
    }

    #[test]
    fn test_extract_nvme() {
        let record = AttributeExtractor::extract(NVME_IDENTITY, NVME_HEALTH, NVME_ATTRIBUTES);

        assert_eq!(record.model, "Samsung SSD 970 EVO Plus 1TB");
        assert_eq!(record.serial_number, "S4EWNX0R123456");
        assert!(record.is_solid_state);
        assert_eq!(record.overall_health, HealthStatus::Passed);
        assert_eq!(record.temperature_celsius, Some(42));
        assert_eq!(record.power_on_hours, Some(1234));
        assert_eq!(record.life_remaining_percent, Some(97));
        assert_eq!(record.total_bytes_written, Some(TIB));
        assert_eq!(record.total_bytes_read, Some(2 * TIB));
    }

    #[test]
    fn test_extract_scsi() {
        let record = AttributeExtractor::extract(SCSI_IDENTITY, SCSI_HEALTH, SCSI_ATTRIBUTES);

        assert_eq!(record.model, "ST4000NM0023");
        assert_eq!(record.serial_number, "Z1Z0ABCD");
        assert!(!record.is_solid_state);
        assert_eq!(record.overall_health, HealthStatus::Passed);
        assert_eq!(record.temperature_celsius, Some(33));
        assert_eq!(record.power_on_hours, Some(40112));
        assert_eq!(record.reallocated_sector_count, Some(0));
        assert_eq!(record.pending_sector_count, None);
    }

    #[test]
    fn test_solid_state_from_model_name() {
        let identity = "Device Model:     KINGSTON SSD A400\nRotation Rate:    Unknown\n";
        let record = AttributeExtractor::extract(identity, "", "");
        assert!(record.is_solid_state);
    }

    #[test]
    fn test_rotation_rate_solid_state_marker() {
        assert!(AttributeExtractor::is_solid_state(
            "Rotation Rate:    Solid State Device",
            None
        ));
        assert!(!AttributeExtractor::is_solid_state(
            "Rotation Rate:    7200 rpm",
            Some("ST2000DM008")
        ));
    }

    #[test]
    fn test_power_on_hours_and_msec() {
        let record = AttributeExtractor::extract(ATA_HDD_IDENTITY, ATA_PASSED_HEALTH, ATA_MSEC_ATTRIBUTES);

        assert_eq!(record.power_on_hours, Some(12345));
        assert_eq!(record.temperature_celsius, Some(39));
        assert_eq!(record.reallocated_sector_count, Some(0));
    }

    #[test]
    fn test_failed_phrase_is_kept_verbatim() {
        let status = AttributeExtractor::extract_health(
            "SMART overall-health self-assessment test result: FAILED!\n",
        );
        assert_eq!(status.to_string(), "FAILED!");
    }

    #[test]
    fn test_health_phrases() {
        assert_eq!(
            AttributeExtractor::extract_health(
                "SMART overall-health self-assessment test result: FAILED!\n"
            ),
            HealthStatus::Failed("FAILED!".to_string())
        );
        assert_eq!(
            AttributeExtractor::extract_health(
                "SMART overall-health self-assessment test result: UNKNOWN!\n"
            ),
            HealthStatus::Other("UNKNOWN!".to_string())
        );
        assert_eq!(
            AttributeExtractor::extract_health("SMART Health Status: FIRMWARE IMPENDING FAILURE\n"),
            HealthStatus::Other("FIRMWARE IMPENDING FAILURE".to_string())
        );
        assert_eq!(
            AttributeExtractor::extract_health("smartctl 7.3\nSMART support is: Unavailable\n"),
            HealthStatus::Unknown
        );
    }

    #[test]
    fn test_nvme_health_word_outside_window_is_ignored() {
        let mut text = String::from("SMART/Health Information (NVMe Log 0x02)\n");
        for i in 0..20 {
            text.push_str(&format!("Field {}: 0\n", i));
        }
        text.push_str("Status: failed\n");
        assert_eq!(AttributeExtractor::extract_health(&text), HealthStatus::Unknown);

        let near = "SMART/Health Information (NVMe Log 0x02)\nCritical Warning: 0x04\nStatus: failed\n";
        assert_eq!(
            AttributeExtractor::extract_health(near),
            HealthStatus::Failed("failed".to_string())
        );
    }

    #[test]
    fn test_media_wearout_indicator_inverts() {
        let attrs = "233 Media_Wearout_Indicator: 85\n";
        assert_eq!(AttributeExtractor::extract_life_remaining(attrs), Some(15));
    }

    #[test]
    fn test_percentage_used_inverts() {
        assert_eq!(
            AttributeExtractor::extract_life_remaining("Percentage Used:                    85%\n"),
            Some(15)
        );
        assert_eq!(
            AttributeExtractor::extract_life_remaining("Percentage Used:                    120%\n"),
            Some(0)
        );
    }

    #[test]
    fn test_lba_and_data_unit_conversion() {
        let ata = "241 Total_LBAs_Written 0x0032 099 099 000 Old_age Always - 2147483648\n";
        let nvme = "Data Units Written:                 2,097,152 [1.07 TB]\n";

        let ata_rec = AttributeExtractor::extract("NVMe", "", ata);
        let nvme_rec = AttributeExtractor::extract("NVMe", "", nvme);

        assert_eq!(ata_rec.total_bytes_written, Some(TIB));
        assert_eq!(nvme_rec.total_bytes_written, Some(TIB));
    }

    #[test]
    fn test_overflow_degrades_to_unset() {
        let attrs = "Data Units Written: 99,999,999,999,999,999\nPower On Hours: 123456789012345678901234\n";
        let record = AttributeExtractor::extract("NVMe", "", attrs);
        assert_eq!(record.total_bytes_written, None);
        assert_eq!(record.power_on_hours, None);
    }

    #[test]
    fn test_empty_text_leaves_everything_unset() {
        let record = AttributeExtractor::extract("", "", "");
        assert_eq!(record, DeviceHealthRecord::default());
    }

    #[test]
    fn test_uncorrectable_rule_order() {
        let (rule, value) =
            rules::first_value_with_rule(&rules::UNCORRECTABLE_RULES, ATA_HDD_ATTRIBUTES).unwrap();
        assert_eq!(rule, "ata_offline_uncorrectable");
        assert_eq!(value, Some(0));

        let reported_only = "187 Reported_Uncorrect 0x0032 100 100 000 Old_age Always - 4\n";
        let (rule, value) =
            rules::first_value_with_rule(&rules::UNCORRECTABLE_RULES, reported_only).unwrap();
        assert_eq!(rule, "ata_reported_uncorrect");
        assert_eq!(value, Some(4));
    }
}
