//! Collector-number normalization and display.
//!
//! Printed collector numbers are messy: `"7"`, `"07"` and `"007"` all refer
//! to the same card. Comparison happens on a normalized form; display always
//! renders the 3-digit zero-padded form collectors expect.

use serde::{Deserialize, Serialize};

use bindery_core::ValueObject;

/// Placeholder rendered for cards that carry no collector number at all.
pub const NO_NUMBER_PLACEHOLDER: &str = "\u{2014}";

/// A card's collector number, held in normalized form.
///
/// Normalization strips leading zeros and left-pads numeric values to three
/// digits, so `"71"` and `"071"` construct equal values. Non-numeric numbers
/// (promo stamps, subset prefixes) are kept verbatim apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectorNumber(String);

impl CollectorNumber {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for CollectorNumber {}

impl core::fmt::Display for CollectorNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw collector number for comparison and display.
///
/// Numeric values lose leading zeros and are left-padded to 3 digits
/// (`"7"` -> `"007"`, `"071"` -> `"071"`, `"1234"` -> `"1234"`). Anything
/// containing a non-digit is only trimmed.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }
    let stripped = trimmed.trim_start_matches('0');
    let digits = if stripped.is_empty() { "0" } else { stripped };
    format!("{digits:0>3}")
}

/// Render a collector number for display.
///
/// With a printed total: `"007/182"`. Without a total: `"007"`. With no
/// number at all: an em-dash placeholder.
pub fn format_collector_number(number: Option<&str>, printed_total: Option<u32>) -> String {
    match (number, printed_total) {
        (Some(n), Some(total)) => format!("{}/{}", normalize(n), total),
        (Some(n), None) => normalize(n),
        (None, _) => NO_NUMBER_PLACEHOLDER.to_string(),
    }
}
