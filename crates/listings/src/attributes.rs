//! Closed attribute enumerations for listings.
//!
//! These are the engine's allowed sets; anything outside them is rejected at
//! the serde boundary rather than stored as free text.

use serde::{Deserialize, Serialize};

/// Physical condition grades, best to worst.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Mint,
    NearMint,
    Excellent,
    Good,
    LightPlayed,
    Played,
    Poor,
}

/// Print languages the marketplace accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    Portuguese,
    Japanese,
    Chinese,
}

/// Card finish variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Normal,
    Holo,
    ReverseHolo,
}
