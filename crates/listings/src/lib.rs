//! Listing lifecycle domain module.
//!
//! This crate contains the business rules for seller listings: the status
//! state machine, commission computation, command validation, and the pure
//! threshold-reconciliation planner. Deterministic domain logic only - no
//! IO, no storage, no clocks (callers supply `occurred_at`).

pub mod attributes;
pub mod fee;
pub mod listing;
pub mod reconcile;

pub use attributes::{Condition, Finish, Language};
pub use fee::FeeBreakdown;
pub use listing::{
    initial_status_for, ApproveOutcome, CreateListing, EditListing, Listing, ListingStatus,
};
pub use reconcile::{effective_value, plan, ReconcilePlan, StatusChange};
