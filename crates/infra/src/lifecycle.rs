//! Listing lifecycle orchestration.
//!
//! This module implements the write path: seller create/edit/delete and
//! admin approve/reject. Decision logic stays pure in `bindery-listings`;
//! this service composes it with the store, the notifier, the audit log,
//! and the threshold reconciler.
//!
//! ## Execution shape
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! Command
//!   ↓
//! 1. Load current state (store)
//!   ↓
//! 2. Decide (pure domain logic - validation, ownership, transitions)
//!   ↓
//! 3. Persist via conditional update (atomic check-and-set)
//!   ↓
//! 4. Audit (admin operations)
//!   ↓
//! 5. Reconcile the seller's listing set (must converge)
//!   ↓
//! 6. Notify the seller (fire-and-forget)
//! ```
//!
//! ## Concurrency
//!
//! The store's `update_if_status` is the only mutual-exclusion primitive
//! the write path needs: a concurrent approve and reject of one listing
//! both pass the pure precondition check, but exactly one conditional
//! update wins; the loser surfaces as `InvalidTransition`, per the
//! moderation contract. Reconciliation is serialized per seller by the
//! [`Reconciler`].
//!
//! ## Failure semantics
//!
//! - Validation/ownership/transition failures happen before any write.
//! - A reconcile failure after a successful write is returned as an error:
//!   callers must treat the whole operation as uncommitted and retry it
//!   (reconciliation is idempotent, so the retry is safe).
//! - Notification failures are logged and swallowed - they never veto a
//!   transition. Audit failures are returned (the write stands; the caller
//!   learns the trail is incomplete).

use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use bindery_core::{
    AdminId, DomainError, ListingId, MarketplaceConfig, SellerId,
};
use bindery_listings::{
    effective_value, initial_status_for, ApproveOutcome, CreateListing, EditListing, Listing,
    ListingStatus,
};

use crate::audit::{AuditEntry, AuditLog};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::reconciler::Reconciler;
use crate::store::{ListingStore, StoreError};

/// Lifecycle operation error: domain taxonomy plus infrastructure layers.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The state change committed but its audit record did not.
    #[error("audit record failed: {0}")]
    Audit(String),
}

impl LifecycleError {
    /// Shorthand used by tests and callers matching on the taxonomy.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// The listing lifecycle write path.
///
/// Generic over its ports so tests run against in-memory implementations
/// and deployments can swap real backends without touching domain code.
pub struct LifecycleService<S, N, A> {
    store: S,
    notifier: N,
    audit: A,
    reconciler: Reconciler<S>,
    config: MarketplaceConfig,
}

impl<S, N, A> LifecycleService<S, N, A>
where
    S: ListingStore + Clone,
    N: Notifier,
    A: AuditLog,
{
    pub fn new(store: S, notifier: N, audit: A, config: MarketplaceConfig) -> Self {
        let reconciler = Reconciler::new(store.clone(), config);
        Self {
            store,
            notifier,
            audit,
            reconciler,
            config,
        }
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Create a listing for a seller.
    ///
    /// The listing is born `pending_review` when the seller's aggregate
    /// (including the new price) reaches the activation threshold, else
    /// `pending_minimum`. Creation can promote the seller's *other* parked
    /// listings - the reconcile pass handles that.
    pub fn create(&self, cmd: CreateListing) -> Result<Listing, LifecycleError> {
        cmd.validate()?;

        let seller_id = cmd.seller_id;
        let occurred_at = cmd.occurred_at;
        let existing = self.store.list_by_seller(seller_id)?;
        let value_before = effective_value(&existing);

        let initial = initial_status_for(
            value_before,
            cmd.price_cents,
            self.config.activation_threshold_cents,
        );
        let listing = cmd.into_listing(ListingId::new(), initial, &self.config.fees)?;

        self.store.insert(listing.clone())?;
        self.reconciler.reconcile(seller_id, occurred_at)?;

        let listing = self.refreshed(listing)?;
        info!(listing_id = %listing.id, %seller_id, status = ?listing.status, "listing created");

        self.send(match listing.status {
            ListingStatus::PendingReview => Notification {
                recipient: seller_id,
                kind: NotificationKind::ListingReceived,
                title: "Listing received".to_string(),
                message: "Your listing has been submitted and is awaiting moderation."
                    .to_string(),
                listing_id: Some(listing.id),
                sent_at: occurred_at,
            },
            _ => Notification {
                recipient: seller_id,
                kind: NotificationKind::ListingHeld,
                title: "Listing received".to_string(),
                message: format!(
                    "Your listing is saved but not yet eligible: your listed inventory \
                     value is below the {} minimum.",
                    self.config.activation_threshold_cents
                ),
                listing_id: Some(listing.id),
                sent_at: occurred_at,
            },
        });

        Ok(listing)
    }

    /// Edit a listing (owner only). Always forces re-moderation.
    pub fn edit(&self, cmd: EditListing) -> Result<Listing, LifecycleError> {
        let current = self
            .store
            .get(cmd.listing_id)?
            .ok_or(DomainError::NotFound)?;

        let edited = current.apply_edit(&cmd, &self.config.fees)?;

        // Conditional on the status the edit was decided against; a
        // concurrent moderation action surfaces as a conflict for the
        // seller to retry against fresh state.
        let stored = self
            .store
            .update_if_status(edited, current.status)
            .map_err(|e| match e {
                StoreError::Conflict(msg) => {
                    LifecycleError::Domain(DomainError::conflict(msg))
                }
                other => LifecycleError::Store(other),
            })?;

        self.reconciler.reconcile(stored.seller_id, cmd.occurred_at)?;

        let stored = self.refreshed(stored)?;
        info!(listing_id = %stored.id, seller_id = %stored.seller_id, "listing edited");

        self.send(Notification {
            recipient: stored.seller_id,
            kind: NotificationKind::ListingResubmitted,
            title: "Listing updated".to_string(),
            message: "Your changes were saved; the listing is back in the moderation queue."
                .to_string(),
            listing_id: Some(stored.id),
            sent_at: cmd.occurred_at,
        });

        Ok(stored)
    }

    /// Delete a listing (owner only).
    ///
    /// Deletion can only lower the seller's aggregate value, potentially
    /// demoting the remaining listings.
    pub fn delete(
        &self,
        listing_id: ListingId,
        seller_id: SellerId,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let current = self.store.get(listing_id)?.ok_or(DomainError::NotFound)?;
        current.ensure_owned_by(seller_id)?;

        self.store.delete(listing_id)?;
        self.reconciler.reconcile(seller_id, occurred_at)?;

        info!(%listing_id, %seller_id, "listing deleted");
        Ok(())
    }

    /// Approve a listing awaiting review.
    ///
    /// The listing activates when the seller's aggregate (including this
    /// listing) meets the threshold; otherwise it is approved on merits
    /// but parked `pending_minimum` until reconciliation promotes it.
    pub fn admin_approve(
        &self,
        listing_id: ListingId,
        admin_id: AdminId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Listing, LifecycleError> {
        let current = self.store.get(listing_id)?.ok_or(DomainError::NotFound)?;
        let seller_listings = self.store.list_by_seller(current.seller_id)?;
        let value = effective_value(&seller_listings);

        let (approved, outcome) =
            current.approve(value, self.config.activation_threshold_cents, occurred_at)?;

        // The precondition check and the write race as one unit: a
        // concurrent approve/reject leaves exactly one winner.
        let stored = self
            .store
            .update_if_status(approved, ListingStatus::PendingReview)
            .map_err(|e| match e {
                StoreError::Conflict(_) => LifecycleError::Domain(
                    DomainError::invalid_transition("listing left review concurrently"),
                ),
                other => LifecycleError::Store(other),
            })?;

        self.audit
            .record(AuditEntry {
                actor: admin_id,
                action: "listing.approved".to_string(),
                listing_id,
                metadata: json!({
                    "seller_id": stored.seller_id,
                    "status": stored.status,
                    "effective_value_cents": value,
                }),
                recorded_at: occurred_at,
            })
            .map_err(|e| LifecycleError::Audit(e.to_string()))?;

        self.reconciler.reconcile(stored.seller_id, occurred_at)?;

        let stored = self.refreshed(stored)?;
        info!(%listing_id, %admin_id, outcome = ?outcome, "listing approved");

        self.send(match outcome {
            ApproveOutcome::Activated => Notification {
                recipient: stored.seller_id,
                kind: NotificationKind::ListingActivated,
                title: "Listing approved".to_string(),
                message: "Your listing was approved and is now live in the marketplace."
                    .to_string(),
                listing_id: Some(listing_id),
                sent_at: occurred_at,
            },
            ApproveOutcome::HeldBelowThreshold => Notification {
                recipient: stored.seller_id,
                kind: NotificationKind::ListingApprovedHeld,
                title: "Listing approved".to_string(),
                message: format!(
                    "Your listing was approved, but it will go live once your listed \
                     inventory value reaches the {} minimum.",
                    self.config.activation_threshold_cents
                ),
                listing_id: Some(listing_id),
                sent_at: occurred_at,
            },
        });

        Ok(stored)
    }

    /// Reject a listing awaiting review, with a reason for the seller.
    pub fn admin_reject(
        &self,
        listing_id: ListingId,
        admin_id: AdminId,
        reason: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<Listing, LifecycleError> {
        let current = self.store.get(listing_id)?.ok_or(DomainError::NotFound)?;
        let rejected = current.reject(reason, occurred_at)?;

        let stored = self
            .store
            .update_if_status(rejected, ListingStatus::PendingReview)
            .map_err(|e| match e {
                StoreError::Conflict(_) => LifecycleError::Domain(
                    DomainError::invalid_transition("listing left review concurrently"),
                ),
                other => LifecycleError::Store(other),
            })?;

        self.audit
            .record(AuditEntry {
                actor: admin_id,
                action: "listing.rejected".to_string(),
                listing_id,
                metadata: json!({
                    "seller_id": stored.seller_id,
                    "reason": stored.rejection_reason,
                }),
                recorded_at: occurred_at,
            })
            .map_err(|e| LifecycleError::Audit(e.to_string()))?;

        // Rejection removes the listing's value from the aggregate, which
        // can demote the seller's remaining listings.
        self.reconciler.reconcile(stored.seller_id, occurred_at)?;

        info!(%listing_id, %admin_id, "listing rejected");

        self.send(Notification {
            recipient: stored.seller_id,
            kind: NotificationKind::ListingRejected,
            title: "Listing rejected".to_string(),
            message: format!(
                "Your listing was rejected by moderation: {}",
                stored.rejection_reason.as_deref().unwrap_or_default()
            ),
            listing_id: Some(listing_id),
            sent_at: occurred_at,
        });

        Ok(stored)
    }

    /// Read-through fetch.
    pub fn get(&self, listing_id: ListingId) -> Result<Listing, LifecycleError> {
        self.store
            .get(listing_id)?
            .ok_or_else(|| LifecycleError::Domain(DomainError::NotFound))
    }

    /// All of one seller's listings (the "my listings" surface).
    pub fn listings_for_seller(&self, seller_id: SellerId) -> Result<Vec<Listing>, LifecycleError> {
        Ok(self.store.list_by_seller(seller_id)?)
    }

    /// Re-read a listing after reconciliation may have moved it.
    fn refreshed(&self, listing: Listing) -> Result<Listing, LifecycleError> {
        Ok(self.store.get(listing.id)?.unwrap_or(listing))
    }

    /// Fire-and-forget notification delivery.
    fn send(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification) {
            warn!(error = %e, "notification delivery failed");
        }
    }
}
