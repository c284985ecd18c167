//! Moderation audit trail port.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use bindery_core::{AdminId, ListingId};

/// One recorded moderation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: AdminId,
    /// Stable action name (e.g. `"listing.approved"`).
    pub action: String,
    pub listing_id: ListingId,
    pub metadata: JsonValue,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("audit record failed: {0}")]
pub struct AuditError(pub String);

/// Audit log port.
///
/// Unlike notifications, audit records are part of the moderation contract:
/// a failure is surfaced to the caller (the state change itself stands -
/// the store write has already committed by the time the entry is written).
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

impl<A> AuditLog for Arc<A>
where
    A: AuditLog + ?Sized,
{
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        (**self).record(entry)
    }
}

/// Recording audit log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .write()
            .map_err(|_| AuditError("lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
