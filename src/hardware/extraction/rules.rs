//! Extraction Rules
//!
//! Every field of a [`DeviceHealthRecord`](crate::domain::ports::DeviceHealthRecord)
//! is filled from an ordered table of named rules. Rules are tried in order
//! and the first one whose pattern matches decides the field, even if its
//! captured text then fails to parse. A new vendor dialect is a new row in a
//! table, not a new branch in the extractor.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

// =============================================================================
// Unit Constants
// =============================================================================

/// Sector size assumed for ATA `Total_LBAs_*` counters
pub const SECTOR_SIZE_BYTES: u64 = 512;

/// Size of one NVMe "data unit" as reported by smartctl
pub const NVME_DATA_UNIT_BYTES: u64 = 512 * 1024;

// =============================================================================
// Text Rules
// =============================================================================

/// A named pattern whose first capture group is taken verbatim
pub struct TextRule {
    /// Rule name, used in logs and tests
    pub name: &'static str,
    regex: Regex,
}

impl TextRule {
    /// Build a rule from a pattern with one capture group
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: compile(name, pattern),
        }
    }

    /// Captured text, trimmed; `None` when the pattern does not match
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    }
}

/// First matching text rule, with the name of the rule that matched
pub fn first_text<'t>(rules: &[TextRule], text: &'t str) -> Option<(&'static str, &'t str)> {
    rules.iter().find_map(|rule| {
        let value = rule.capture(text)?;
        trace!(rule = rule.name, value, "text rule matched");
        Some((rule.name, value))
    })
}

// =============================================================================
// Numeric Rules
// =============================================================================

/// How the captured text of a numeric rule is turned into a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueReader {
    /// Remainder of an ATA attribute row after the attribute name
    AtaAttribute,
    /// Plain decimal count, comma group separators allowed
    Count,
}

/// A named pattern producing an integer, with an optional unit conversion
pub struct NumericRule {
    /// Rule name, used in logs and tests
    pub name: &'static str,
    regex: Regex,
    reader: ValueReader,
    convert: fn(u64) -> Option<u64>,
}

impl NumericRule {
    /// Rule matching an ATA attribute row by attribute name
    ///
    /// `attribute` is a regex fragment, e.g. `Offline_Uncorrectable` or
    /// `Temperature_[A-Za-z]+`. The row may be a full smartctl table row
    /// (with or without the leading ID column) or a loose `Name: value` line.
    pub fn ata(name: &'static str, attribute: &str) -> Self {
        let pattern = format!(r"(?m)^[ \t]*(?:\d+[ \t]+)?(?:{})\b[ \t:]*(.*)$", attribute);
        Self {
            name,
            regex: compile(name, &pattern),
            reader: ValueReader::AtaAttribute,
            convert: Some,
        }
    }

    /// Rule matching a labeled count; the pattern's first group is the number
    pub fn labeled(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: compile(name, pattern),
            reader: ValueReader::Count,
            convert: Some,
        }
    }

    /// Apply a unit conversion to the parsed value
    pub fn with_conversion(mut self, convert: fn(u64) -> Option<u64>) -> Self {
        self.convert = convert;
        self
    }

    /// Raw captured text; `None` when the pattern does not match
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Parse and convert captured text
    pub fn read(&self, raw: &str) -> Option<u64> {
        let parsed = match self.reader {
            ValueReader::AtaAttribute => ata_raw_value(raw).and_then(parse_count),
            ValueReader::Count => parse_count(raw.trim()),
        };

        let value = match parsed {
            Some(v) => v,
            None => {
                debug!(rule = self.name, raw, "captured value is not a usable integer");
                return None;
            }
        };

        let converted = (self.convert)(value);
        if converted.is_none() {
            debug!(rule = self.name, value, "unit conversion out of range");
        }
        converted
    }
}

/// Evaluate rules in order; the first pattern match decides the value
pub fn first_value(rules: &[NumericRule], text: &str) -> Option<u64> {
    first_value_with_rule(rules, text).and_then(|(_, value)| value)
}

/// Like [`first_value`], also naming the rule whose pattern matched
pub fn first_value_with_rule(
    rules: &[NumericRule],
    text: &str,
) -> Option<(&'static str, Option<u64>)> {
    rules.iter().find_map(|rule| {
        let raw = rule.capture(text)?;
        let value = rule.read(raw);
        trace!(rule = rule.name, ?value, "numeric rule matched");
        Some((rule.name, value))
    })
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Locate the RAW_VALUE digits in the remainder of an ATA attribute row
///
/// Handles the default table layout (`FLAG VALUE WORST THRESH TYPE UPDATED
/// WHEN_FAILED RAW_VALUE`), the `-f brief` layout (`FLAGS VALUE WORST THRESH
/// FAIL RAW_VALUE`) and loose `Name: value` lines.
pub fn ata_raw_value(rest: &str) -> Option<&str> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let raw = match tokens.first() {
        Some(flag) if flag.starts_with("0x") && tokens.len() >= 8 => tokens[7],
        Some(flag) if is_brief_flags(flag) && tokens.len() >= 6 => tokens[5],
        _ => return first_digit_run(rest),
    };
    leading_digits(raw)
}

fn is_brief_flags(token: &str) -> bool {
    token.len() == 6 && token.chars().all(|c| "POSRCK-".contains(c))
}

/// Leading ASCII digits of a token (`1234h+05m` -> `1234`)
fn leading_digits(token: &str) -> Option<&str> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    if end == 0 {
        None
    } else {
        Some(&token[..end])
    }
}

/// First run of ASCII digits anywhere in the text
fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    leading_digits(&text[start..])
}

/// Parse a decimal count, ignoring comma group separators
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

// =============================================================================
// Unit Conversions
// =============================================================================

/// ATA LBA count to bytes
pub fn lbas_to_bytes(lbas: u64) -> Option<u64> {
    lbas.checked_mul(SECTOR_SIZE_BYTES)
}

/// NVMe data units to bytes
pub fn data_units_to_bytes(units: u64) -> Option<u64> {
    units.checked_mul(NVME_DATA_UNIT_BYTES)
}

/// Percentage consumed to percentage remaining, clamped to `[0, 100]`
pub fn remaining_from_used(used: u64) -> Option<u64> {
    Some(100u64.saturating_sub(used))
}

/// Percentage remaining reported directly, clamped to `[0, 100]`
pub fn remaining_direct(remaining: u64) -> Option<u64> {
    Some(remaining.min(100))
}

fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern for rule {}: {}", name, e))
}

// =============================================================================
// Rule Tables
// =============================================================================

/// Model name, vendor phrasings in priority order
pub static MODEL_RULES: Lazy<Vec<TextRule>> = Lazy::new(|| {
    vec![
        TextRule::new("ata_device_model", r"(?m)^[ \t]*Device Model:[ \t]*(.+?)\s*$"),
        TextRule::new("scsi_product", r"(?m)^[ \t]*Product:[ \t]*(.+?)\s*$"),
        TextRule::new("nvme_model_number", r"(?m)^[ \t]*Model Number:[ \t]*(.+?)\s*$"),
    ]
});

pub static SERIAL_RULES: Lazy<Vec<TextRule>> = Lazy::new(|| {
    vec![TextRule::new(
        "serial_number",
        r"(?mi)^[ \t]*Serial Number:[ \t]*(.+?)\s*$",
    )]
});

/// Identity markers that mean solid-state media
pub static SOLID_STATE_MARKERS: Lazy<Regex> = Lazy::new(|| {
    compile(
        "solid_state_markers",
        r"Solid State Device|Rotation Rate:\s*Solid State|NVMe",
    )
});

pub static ATA_HEALTH_RULE: Lazy<TextRule> = Lazy::new(|| {
    TextRule::new(
        "ata_self_assessment",
        r"(?m)SMART overall-health self-assessment test result:[ \t]*(.+?)\s*$",
    )
});

pub static SCSI_HEALTH_RULE: Lazy<TextRule> = Lazy::new(|| {
    TextRule::new("scsi_health_status", r"(?m)SMART Health Status:[ \t]*(.+?)\s*$")
});

pub static NVME_HEALTH_HEADER: Lazy<Regex> =
    Lazy::new(|| compile("nvme_health_header", r"SMART/Health Information"));

pub static NVME_HEALTH_WORD: Lazy<Regex> =
    Lazy::new(|| compile("nvme_health_word", r"(?i)\b(normal|failed)\b"));

/// Lines after the NVMe health header searched for a health word
pub const NVME_HEALTH_WINDOW_LINES: usize = 10;

pub static TEMPERATURE_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_temperature_celsius", "Temperature_Celsius"),
        NumericRule::ata(
            "ata_airflow_temperature",
            "Airflow_Temperature_Cel|Temperature_[A-Za-z]+",
        ),
        NumericRule::labeled(
            "nvme_temperature",
            r"(?m)^[ \t]*Temperature:[ \t]+(\d+)[ \t]+Celsius",
        ),
        NumericRule::labeled(
            "scsi_current_temperature",
            r"(?m)^[ \t]*Current Drive Temperature:[ \t]+(\d+)[ \t]*C\b",
        ),
    ]
});

pub static POWER_ON_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_power_on_hours", "Power_On_Hours(?:_and_Msec)?"),
        NumericRule::labeled(
            "nvme_power_on_hours",
            r"(?m)^[ \t]*Power On Hours:[ \t]+([\d,]+)",
        ),
        NumericRule::labeled(
            "scsi_accumulated_power_on",
            r"Accumulated power on time, hours:minutes[ \t]+([\d,]+):\d+",
        ),
    ]
});

pub static REALLOCATED_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_reallocated_sector_ct", "Reallocated_Sector_Ct"),
        NumericRule::labeled(
            "scsi_grown_defect_list",
            r"Elements in grown defect list:[ \t]+([\d,]+)",
        ),
    ]
});

pub static PENDING_RULES: Lazy<Vec<NumericRule>> =
    Lazy::new(|| vec![NumericRule::ata("ata_current_pending_sector", "Current_Pending_Sector")]);

pub static UNCORRECTABLE_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_offline_uncorrectable", "Offline_Uncorrectable"),
        NumericRule::ata("ata_reported_uncorrect", "Reported_Uncorrect"),
    ]
});

pub static LIFE_REMAINING_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_wear_leveling_count", "Wear_Leveling_Count")
            .with_conversion(remaining_direct),
        NumericRule::ata("ata_media_wearout_indicator", "Media_Wearout_Indicator")
            .with_conversion(remaining_from_used),
        NumericRule::labeled("nvme_percentage_used", r"Percentage Used:[ \t]+(\d+)%")
            .with_conversion(remaining_from_used),
    ]
});

pub static BYTES_WRITTEN_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_total_lbas_written", "Total_LBAs_Written")
            .with_conversion(lbas_to_bytes),
        NumericRule::labeled("nvme_data_units_written", r"Data Units Written:[ \t]+([\d,]+)")
            .with_conversion(data_units_to_bytes),
    ]
});

pub static BYTES_READ_RULES: Lazy<Vec<NumericRule>> = Lazy::new(|| {
    vec![
        NumericRule::ata("ata_total_lbas_read", "Total_LBAs_Read").with_conversion(lbas_to_bytes),
        NumericRule::labeled("nvme_data_units_read", r"Data Units Read:[ \t]+([\d,]+)")
            .with_conversion(data_units_to_bytes),
    ]
});
