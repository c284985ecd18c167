//! Structural search classification.
//!
//! A raw marketplace query is classified into exactly one shape before it
//! ever reaches the catalog: collectors search by collector number at least
//! as often as by name, and `"71/182"` means something much more specific
//! than a substring match would give.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::collector::normalize;

/// The classified form of a raw search string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchQuery {
    /// `"<digits>/<digits>"` - collector number within a specific printed total.
    ExactNumber { number: String, total: u32 },
    /// `"<digits>/"` - collector number, any printed total.
    NumberPrefix { number: String },
    /// All digits, no slash - collector number alone.
    Number { number: String },
    /// Anything else - case-insensitive substring match on the card name.
    Text(String),
}

impl SearchQuery {
    /// Classify a raw query into exactly one structural shape.
    ///
    /// Collector numbers are normalized at classification time, so
    /// `"71/182"` and `"071/182"` produce identical queries.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some((left, right)) = trimmed.split_once('/') {
            let left = left.trim();
            let right = right.trim();
            if !left.is_empty() && left.chars().all(|c| c.is_ascii_digit()) {
                if right.is_empty() {
                    return Self::NumberPrefix {
                        number: normalize(left),
                    };
                }
                if let Ok(total) = right.parse::<u32>() {
                    return Self::ExactNumber {
                        number: normalize(left),
                        total,
                    };
                }
            }
            return Self::Text(trimmed.to_lowercase());
        }

        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Self::Number {
                number: normalize(trimmed),
            };
        }

        Self::Text(trimmed.to_lowercase())
    }

    /// Whether a catalog card matches this query.
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Self::ExactNumber { number, total } => {
                card.collector_number
                    .as_ref()
                    .is_some_and(|n| n.as_str() == number)
                    && card.printed_total == Some(*total)
            }
            Self::NumberPrefix { number } | Self::Number { number } => card
                .collector_number
                .as_ref()
                .is_some_and(|n| n.as_str() == number),
            Self::Text(needle) => {
                needle.is_empty() || card.name.to_lowercase().contains(needle)
            }
        }
    }

    /// Suggestion matching: free text also matches the parent group name.
    ///
    /// Structured number queries behave exactly like [`Self::matches`].
    pub fn matches_suggestion(&self, card: &Card) -> bool {
        match self {
            Self::Text(needle) => {
                needle.is_empty()
                    || card.name.to_lowercase().contains(needle)
                    || card.group_name.to_lowercase().contains(needle)
            }
            _ => self.matches(card),
        }
    }
}
