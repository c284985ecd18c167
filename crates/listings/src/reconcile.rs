//! Threshold reconciliation planning.
//!
//! Reconciliation re-derives each listing's threshold-gated status from the
//! seller's current aggregate. The planner here is pure and single-snapshot:
//! one `effective_value` is computed up front and every promotion/demotion
//! is decided against it, so a plan cannot oscillate. Execution against a
//! store (locking, retries) lives in the infra layer.

use serde::{Deserialize, Serialize};

use bindery_core::ListingId;

use crate::listing::{Listing, ListingStatus};

/// Sum of prices over the seller's live listings (`active`,
/// `pending_review`, `pending_minimum`) - the aggregate gating visibility.
///
/// Promotions and demotions only move listings between live statuses, so a
/// reconciliation pass never changes this value.
pub fn effective_value<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> u64 {
    listings
        .into_iter()
        .filter(|l| l.status.counts_toward_threshold())
        .map(|l| l.price_cents)
        .sum()
}

/// One planned promotion or demotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub listing_id: ListingId,
    pub from: ListingStatus,
    pub to: ListingStatus,
}

/// The full reconciliation decision for one seller's listing set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    /// The snapshot every change in this plan was decided against.
    pub effective_value: u64,
    pub changes: Vec<StatusChange>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Plan reconciliation for one seller's complete listing set.
///
/// At/above the threshold every `pending_minimum` listing is promoted to
/// `pending_review`; below it every `active` or `pending_review` listing is
/// demoted to `pending_minimum`. Terminal listings are never touched.
pub fn plan(listings: &[Listing], threshold_cents: u64) -> ReconcilePlan {
    let effective = effective_value(listings);
    let met = effective >= threshold_cents;

    let changes = listings
        .iter()
        .filter_map(|l| {
            let to = match l.status {
                ListingStatus::PendingMinimum if met => ListingStatus::PendingReview,
                ListingStatus::Active | ListingStatus::PendingReview if !met => {
                    ListingStatus::PendingMinimum
                }
                _ => return None,
            };
            Some(StatusChange {
                listing_id: l.id,
                from: l.status,
                to,
            })
        })
        .collect();

    ReconcilePlan {
        effective_value: effective,
        changes,
    }
}
