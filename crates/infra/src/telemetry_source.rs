//! Usage telemetry read port.
//!
//! Telemetry is a best-effort external source: the ranking pipeline treats
//! a failed read as "no signal" and keeps going. The error type is
//! deliberately opaque (`anyhow`) - callers only ever log it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use bindery_core::CardId;
use bindery_market::{TelemetryCounts, UsageEvent};

/// Rolling-count telemetry port.
pub trait TelemetryReader: Send + Sync {
    /// Per-card view/click counts over events at or after `since`.
    ///
    /// Cards with no events are simply absent from the map.
    fn counts_since(&self, since: DateTime<Utc>)
        -> Result<HashMap<CardId, TelemetryCounts>, anyhow::Error>;
}

impl<T> TelemetryReader for Arc<T>
where
    T: TelemetryReader + ?Sized,
{
    fn counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<CardId, TelemetryCounts>, anyhow::Error> {
        (**self).counts_since(since)
    }
}

/// In-memory telemetry source for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    events: RwLock<Vec<UsageEvent>>,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: UsageEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

impl TelemetryReader for InMemoryTelemetry {
    fn counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<CardId, TelemetryCounts>, anyhow::Error> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow::anyhow!("lock poisoned"))?;

        let mut counts: HashMap<CardId, TelemetryCounts> = HashMap::new();
        for event in events.iter().filter(|e| e.occurred_at >= since) {
            counts.entry(event.card_id).or_default().add(event.kind);
        }
        Ok(counts)
    }
}
