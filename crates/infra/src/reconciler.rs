//! Threshold reconciliation execution.
//!
//! The planner in `bindery-listings` decides; this module applies the plan
//! against the store. Two guarantees live here:
//!
//! - **Per-seller serialization**: overlapping reconciliations for one
//!   seller take turns (a lock keyed by `SellerId`), so two writers cannot
//!   interleave stale effective-value snapshots. Different sellers share
//!   nothing and proceed in parallel.
//! - **No partial end state**: every status write is conditional on the
//!   status the plan observed. Any conflict or store failure throws the
//!   pass away and replans from fresh state, so a half-applied pass is
//!   always followed by another full pass. Only after a fresh read yields
//!   an empty plan does reconciliation report convergence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use bindery_core::{MarketplaceConfig, SellerId};
use bindery_listings::{plan, ListingStatus, ReconcilePlan};

use crate::store::{ListingStore, StoreError};

/// Attempt bound for one reconcile call. Reconciliation retries until the
/// seller's listing set is convergent; the bound exists so a persistently
/// failing store surfaces as an error instead of an infinite loop.
const MAX_ATTEMPTS: usize = 8;

/// What a convergent reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub seller_id: SellerId,
    /// The effective value the converged state was verified against.
    pub effective_value: u64,
    pub promoted: usize,
    pub demoted: usize,
    pub attempts: usize,
}

/// Executes threshold reconciliation for sellers.
pub struct Reconciler<S> {
    store: S,
    config: MarketplaceConfig,
    locks: Mutex<HashMap<SellerId, Arc<Mutex<()>>>>,
}

impl<S> Reconciler<S>
where
    S: ListingStore,
{
    pub fn new(store: S, config: MarketplaceConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn seller_lock(&self, seller_id: SellerId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Storage("reconciler lock poisoned".to_string()))?;
        Ok(locks.entry(seller_id).or_default().clone())
    }

    /// Reconcile one seller's listing set until convergent.
    ///
    /// Callers invoke this synchronously after every operation that can
    /// change the seller's effective value; if it fails, the preceding
    /// state change must not be treated as committed.
    pub fn reconcile(
        &self,
        seller_id: SellerId,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, StoreError> {
        let lock = self.seller_lock(seller_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::Storage("seller lock poisoned".to_string()))?;

        let mut promoted = 0usize;
        let mut demoted = 0usize;
        let mut last_err: Option<StoreError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let current_plan = match self.load_and_plan(seller_id) {
                Ok(p) => p,
                Err(e) => {
                    warn!(%seller_id, attempt, error = %e, "reconcile read failed, retrying");
                    last_err = Some(e);
                    continue;
                }
            };

            if current_plan.is_empty() {
                debug!(
                    %seller_id,
                    effective_value = current_plan.effective_value,
                    promoted,
                    demoted,
                    attempt,
                    "reconcile converged"
                );
                return Ok(ReconcileOutcome {
                    seller_id,
                    effective_value: current_plan.effective_value,
                    promoted,
                    demoted,
                    attempts: attempt,
                });
            }

            promoted = 0;
            demoted = 0;
            match self.apply_plan(&current_plan, now, &mut promoted, &mut demoted) {
                Ok(()) => {
                    // Loop once more: convergence is only claimed after a
                    // fresh read produces an empty plan.
                }
                Err(e) => {
                    warn!(%seller_id, attempt, error = %e, "reconcile write lost, replanning");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            StoreError::Conflict(format!(
                "reconciliation for seller {seller_id} did not converge after {MAX_ATTEMPTS} attempts"
            ))
        }))
    }

    fn load_and_plan(&self, seller_id: SellerId) -> Result<ReconcilePlan, StoreError> {
        let listings = self.store.list_by_seller(seller_id)?;
        Ok(plan(&listings, self.config.activation_threshold_cents))
    }

    fn apply_plan(
        &self,
        current_plan: &ReconcilePlan,
        now: DateTime<Utc>,
        promoted: &mut usize,
        demoted: &mut usize,
    ) -> Result<(), StoreError> {
        for change in &current_plan.changes {
            let listing = self
                .store
                .get(change.listing_id)?
                .ok_or(StoreError::NotFound)?;

            // The row moved since planning; the fresh replan will pick it up.
            if listing.status != change.from {
                return Err(StoreError::Conflict(format!(
                    "listing {} changed mid-reconcile",
                    change.listing_id
                )));
            }

            let moved = listing.with_status(change.to, now);
            self.store.update_if_status(moved, change.from)?;

            match change.to {
                ListingStatus::PendingReview => *promoted += 1,
                ListingStatus::PendingMinimum => *demoted += 1,
                _ => {}
            }
        }
        Ok(())
    }
}
