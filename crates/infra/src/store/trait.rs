use std::sync::Arc;

use thiserror::Error;

use bindery_core::{CardId, ListingId, SellerId};
use bindery_listings::{Listing, ListingStatus};

/// Listing store operation error.
///
/// These are **infrastructure errors** (missing rows, lost conditional
/// updates, backend failures) as opposed to domain errors (validation,
/// ownership, state-machine preconditions). The lifecycle layer maps them
/// into the caller-facing taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced listing does not exist.
    #[error("listing not found")]
    NotFound,

    /// A conditional update observed a different status than expected.
    #[error("conditional update conflict: {0}")]
    Conflict(String),

    /// The backend failed (connectivity, poisoned lock, ...). Possibly
    /// transient; reconciliation retries these.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Transactional listing store port.
///
/// The engine assumes a transactional relational store behind this trait; it
/// never implements one. Implementations must provide:
///
/// - **Atomic conditional updates**: `update_if_status` compares the stored
///   status and writes in one atomic step. Two concurrent conditional
///   updates against the same listing must yield exactly one winner; the
///   loser gets [`StoreError::Conflict`]. This is what makes a concurrent
///   approve + reject race resolve to one success.
/// - **Stable scans**: the `list_*` queries return consistent snapshots of
///   current rows (no torn reads of a half-applied update).
///
/// All methods are synchronous; implementations own whatever pooling or
/// blocking their backend needs.
pub trait ListingStore: Send + Sync {
    /// Insert a new listing. Inserting an existing id is a conflict.
    fn insert(&self, listing: Listing) -> Result<(), StoreError>;

    /// Fetch one listing by id.
    fn get(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;

    /// Persist `listing` only if the stored row currently has
    /// `expected_status` (atomic check-and-set). Returns the stored state.
    fn update_if_status(
        &self,
        listing: Listing,
        expected_status: ListingStatus,
    ) -> Result<Listing, StoreError>;

    /// Remove a listing, returning its last state.
    fn delete(&self, id: ListingId) -> Result<Listing, StoreError>;

    /// All listings owned by one seller, in no particular order.
    fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Listing>, StoreError>;

    /// All listings offering one catalog card, in no particular order.
    fn list_by_card(&self, card_id: CardId) -> Result<Vec<Listing>, StoreError>;

    /// All listings currently visible in the marketplace (`active`).
    fn list_active(&self) -> Result<Vec<Listing>, StoreError>;
}

impl<S> ListingStore for Arc<S>
where
    S: ListingStore + ?Sized,
{
    fn insert(&self, listing: Listing) -> Result<(), StoreError> {
        (**self).insert(listing)
    }

    fn get(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        (**self).get(id)
    }

    fn update_if_status(
        &self,
        listing: Listing,
        expected_status: ListingStatus,
    ) -> Result<Listing, StoreError> {
        (**self).update_if_status(listing, expected_status)
    }

    fn delete(&self, id: ListingId) -> Result<Listing, StoreError> {
        (**self).delete(id)
    }

    fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Listing>, StoreError> {
        (**self).list_by_seller(seller_id)
    }

    fn list_by_card(&self, card_id: CardId) -> Result<Vec<Listing>, StoreError> {
        (**self).list_by_card(card_id)
    }

    fn list_active(&self) -> Result<Vec<Listing>, StoreError> {
        (**self).list_active()
    }
}
