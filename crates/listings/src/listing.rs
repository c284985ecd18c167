use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bindery_core::{
    AccountClass, CardId, DomainError, DomainResult, Entity, FeeSchedule, ListingId, SellerId,
};

use crate::attributes::{Condition, Finish, Language};
use crate::fee::FeeBreakdown;

/// Listing status lifecycle.
///
/// `Sold` and `Cancelled` are terminal. `Rejected` can only be left through
/// a fresh edit, which resubmits the listing for review.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Approved-or-new listing held back because the seller's aggregate
    /// listed value is below the activation threshold.
    PendingMinimum,
    /// Awaiting admin moderation.
    PendingReview,
    /// Moderated and visible in the marketplace.
    Active,
    /// Declined by an admin; carries a rejection reason.
    Rejected,
    Sold,
    Cancelled,
}

impl ListingStatus {
    /// Whether this listing's price counts toward the seller's effective value.
    ///
    /// All live (non-terminal) listings count, including `pending_minimum`
    /// ones: a seller whose parked listings were excluded could never
    /// accumulate enough aggregate value to cross the threshold at all.
    pub fn counts_toward_threshold(self) -> bool {
        matches!(self, Self::Active | Self::PendingReview | Self::PendingMinimum)
    }

    /// Whether the listing participates in marketplace aggregates and search.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled | Self::Rejected)
    }

    /// Exhaustive transition table.
    ///
    /// Every status may transition to `PendingReview` because an edit always
    /// resubmits for moderation; everything else is narrowly permitted.
    /// Self-transitions are not transitions.
    pub fn can_transition(self, to: Self) -> bool {
        if self == to {
            return false;
        }
        match to {
            // Edit/resubmit path (any origin) and threshold promotion.
            Self::PendingReview => true,
            // Admin approval at/above threshold.
            Self::Active => matches!(self, Self::PendingReview),
            // Threshold demotion, or approval below threshold.
            Self::PendingMinimum => matches!(self, Self::PendingReview | Self::Active),
            // Admin rejection.
            Self::Rejected => matches!(self, Self::PendingReview),
            // Purchase completion (driven by the surrounding application).
            Self::Sold => matches!(self, Self::Active),
            // Seller withdrawal.
            Self::Cancelled => matches!(
                self,
                Self::PendingMinimum | Self::PendingReview | Self::Active
            ),
        }
    }
}

/// One seller's offer of a quantity of a specific catalog card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: SellerId,
    pub card_id: CardId,
    pub price_cents: u64,
    pub fee_cents: u64,
    pub net_cents: u64,
    pub quantity: u32,
    pub condition: Condition,
    pub language: Language,
    pub finish: Finish,
    pub notes: Option<String>,
    pub status: ListingStatus,
    /// Set only while `status` is `Rejected`.
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Listing {
    type Id = ListingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Pick the status a new listing is born with.
///
/// The pre-insert effective value plus the new price decides whether the
/// listing goes straight to moderation or waits for more inventory value.
pub fn initial_status_for(
    effective_value_before: u64,
    price_cents: u64,
    threshold_cents: u64,
) -> ListingStatus {
    if effective_value_before + price_cents >= threshold_cents {
        ListingStatus::PendingReview
    } else {
        ListingStatus::PendingMinimum
    }
}

/// Command: create a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateListing {
    pub seller_id: SellerId,
    pub card_id: CardId,
    pub price_cents: u64,
    pub quantity: u32,
    pub condition: Condition,
    pub language: Language,
    pub finish: Finish,
    pub notes: Option<String>,
    pub account_class: AccountClass,
    pub occurred_at: DateTime<Utc>,
}

impl CreateListing {
    pub fn validate(&self) -> DomainResult<()> {
        validate_price(self.price_cents)?;
        validate_quantity(self.quantity)
    }

    /// Build the listing this command describes.
    ///
    /// `initial_status` comes from [`initial_status_for`]; the caller owns
    /// the effective-value read that feeds it.
    pub fn into_listing(
        self,
        id: ListingId,
        initial_status: ListingStatus,
        schedule: &FeeSchedule,
    ) -> DomainResult<Listing> {
        self.validate()?;
        debug_assert!(matches!(
            initial_status,
            ListingStatus::PendingMinimum | ListingStatus::PendingReview
        ));

        let fees = FeeBreakdown::for_class(self.price_cents, schedule, self.account_class);
        Ok(Listing {
            id,
            seller_id: self.seller_id,
            card_id: self.card_id,
            price_cents: self.price_cents,
            fee_cents: fees.fee_cents,
            net_cents: fees.net_cents,
            quantity: self.quantity,
            condition: self.condition,
            language: self.language,
            finish: self.finish,
            notes: self.notes,
            status: initial_status,
            rejection_reason: None,
            created_at: self.occurred_at,
            updated_at: self.occurred_at,
        })
    }
}

/// Command: edit a listing (owner only; forces re-moderation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditListing {
    pub listing_id: ListingId,
    pub seller_id: SellerId,
    pub price_cents: u64,
    pub quantity: u32,
    pub condition: Condition,
    pub language: Language,
    pub finish: Finish,
    pub notes: Option<String>,
    pub account_class: AccountClass,
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of an admin approval: where the listing actually landed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApproveOutcome {
    /// Approved and visible.
    Activated,
    /// Approved on merits, parked until the seller's aggregate value
    /// reaches the threshold.
    HeldBelowThreshold,
}

impl Listing {
    /// Derived commission split.
    pub fn fee_breakdown(&self) -> FeeBreakdown {
        FeeBreakdown {
            fee_cents: self.fee_cents,
            net_cents: self.net_cents,
        }
    }

    pub fn ensure_owned_by(&self, seller_id: SellerId) -> DomainResult<()> {
        if self.seller_id != seller_id {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    /// Apply an edit: revalidate, recompute fees, force `PendingReview`.
    ///
    /// Returns the new listing state; the id never changes.
    pub fn apply_edit(&self, cmd: &EditListing, schedule: &FeeSchedule) -> DomainResult<Listing> {
        self.ensure_owned_by(cmd.seller_id)?;
        validate_price(cmd.price_cents)?;
        validate_quantity(cmd.quantity)?;

        let fees = FeeBreakdown::for_class(cmd.price_cents, schedule, cmd.account_class);
        Ok(Listing {
            id: self.id,
            seller_id: self.seller_id,
            card_id: self.card_id,
            price_cents: cmd.price_cents,
            fee_cents: fees.fee_cents,
            net_cents: fees.net_cents,
            quantity: cmd.quantity,
            condition: cmd.condition,
            language: cmd.language,
            finish: cmd.finish,
            notes: cmd.notes.clone(),
            status: ListingStatus::PendingReview,
            rejection_reason: None,
            created_at: self.created_at,
            updated_at: cmd.occurred_at,
        })
    }

    /// Admin approval decision.
    ///
    /// `effective_value` must include this listing's own price. The listing
    /// lands in `Active` at/above the threshold, `PendingMinimum` below it.
    pub fn approve(
        &self,
        effective_value: u64,
        threshold_cents: u64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<(Listing, ApproveOutcome)> {
        if self.status != ListingStatus::PendingReview {
            return Err(DomainError::invalid_transition(format!(
                "only listings awaiting review can be approved (status: {:?})",
                self.status
            )));
        }

        let (status, outcome) = if effective_value >= threshold_cents {
            (ListingStatus::Active, ApproveOutcome::Activated)
        } else {
            (
                ListingStatus::PendingMinimum,
                ApproveOutcome::HeldBelowThreshold,
            )
        };

        let mut approved = self.clone();
        approved.status = status;
        approved.rejection_reason = None;
        approved.updated_at = occurred_at;
        Ok((approved, outcome))
    }

    /// Admin rejection decision.
    pub fn reject(&self, reason: &str, occurred_at: DateTime<Utc>) -> DomainResult<Listing> {
        if self.status != ListingStatus::PendingReview {
            return Err(DomainError::invalid_transition(format!(
                "only listings awaiting review can be rejected (status: {:?})",
                self.status
            )));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::invalid_reason(
                "rejection reason must not be empty",
            ));
        }

        let mut rejected = self.clone();
        rejected.status = ListingStatus::Rejected;
        rejected.rejection_reason = Some(reason.to_string());
        rejected.updated_at = occurred_at;
        Ok(rejected)
    }

    /// Reconciliation move: promote/demote across the threshold boundary.
    pub fn with_status(&self, status: ListingStatus, occurred_at: DateTime<Utc>) -> Listing {
        let mut moved = self.clone();
        moved.status = status;
        moved.updated_at = occurred_at;
        moved
    }
}

fn validate_price(price_cents: u64) -> DomainResult<()> {
    if price_cents == 0 {
        return Err(DomainError::invalid_price(
            "price must be a positive amount of minor units",
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: u32) -> DomainResult<()> {
    if quantity < 1 {
        return Err(DomainError::invalid_quantity("quantity must be at least 1"));
    }
    Ok(())
}
