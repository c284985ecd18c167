//! Card catalog domain module.
//!
//! This crate contains the catalog-side business rules: the card entity,
//! collector-number normalization and display, and the structural search
//! classification applied to raw marketplace queries. Pure domain logic -
//! no IO, no storage.

pub mod card;
pub mod collector;
pub mod search;

pub use card::{Card, CardFilter, Rarity, Supertype};
pub use collector::{format_collector_number, CollectorNumber, NO_NUMBER_PLACEHOLDER};
pub use search::SearchQuery;
