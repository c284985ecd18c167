//! Seller notification port.
//!
//! Notifications are fire-and-forget: delivery failures are logged by the
//! caller and never roll back the state transition that triggered them.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bindery_core::{ListingId, SellerId};

/// What happened to the seller's listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Created and queued for moderation.
    ListingReceived,
    /// Created (or still) below the activation threshold.
    ListingHeld,
    /// Edited and resubmitted for moderation.
    ListingResubmitted,
    /// Approved and visible.
    ListingActivated,
    /// Approved but parked below the activation threshold.
    ListingApprovedHeld,
    /// Declined by moderation.
    ListingRejected,
}

/// One outbound message to a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: SellerId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub listing_id: Option<ListingId>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Notification delivery port.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

/// Recording notifier for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: RwLock<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages delivered to one seller, in order.
    pub fn sent_to(&self, recipient: SellerId) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.recipient == recipient)
            .collect()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent
            .write()
            .map_err(|_| NotifyError("lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
