//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, state-machine preconditions). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A listing price failed validation (must be a positive amount of minor units).
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// A listing quantity failed validation (must be at least 1).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A rejection reason failed validation (must be non-empty).
    #[error("invalid reason: {0}")]
    InvalidReason(String),

    /// The acting user does not own the listing.
    #[error("unauthorized")]
    Unauthorized,

    /// A state-machine precondition was not met (e.g. approving a listing
    /// that is not awaiting review).
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A referenced listing/card/seller is absent (domain-level).
    #[error("not found")]
    NotFound,

    /// A concurrent conditional update lost the race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure at a boundary).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_price(msg: impl Into<String>) -> Self {
        Self::InvalidPrice(msg.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn invalid_reason(msg: impl Into<String>) -> Self {
        Self::InvalidReason(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
