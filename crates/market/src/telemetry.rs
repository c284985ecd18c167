//! Usage-telemetry input types.
//!
//! Telemetry is a read-only, best-effort signal: the ranking pipeline reads
//! rolling view/click counts per card and treats missing data as zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bindery_core::CardId;

/// The two event kinds the ranking pipeline consumes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    CardViewed,
    BuyClicked,
}

impl TelemetryKind {
    /// Stable wire name of the event kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CardViewed => "card_viewed",
            Self::BuyClicked => "buy_clicked",
        }
    }
}

/// One raw telemetry event, as emitted by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub kind: TelemetryKind,
    pub card_id: CardId,
    pub occurred_at: DateTime<Utc>,
}

/// Rolling event counts for one card.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounts {
    pub views: u64,
    pub clicks: u64,
}

impl TelemetryCounts {
    pub fn add(&mut self, kind: TelemetryKind) {
        match kind {
            TelemetryKind::CardViewed => self.views += 1,
            TelemetryKind::BuyClicked => self.clicks += 1,
        }
    }
}
