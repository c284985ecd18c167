//! Engine configuration.
//!
//! The activation threshold and the commission schedule are business
//! parameters, not invariants. They are carried explicitly so tests (and
//! deployments) can override them; nothing in the engine reads them from
//! global state.

use serde::{Deserialize, Serialize};

/// Seller account classification, used to pick the commission rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountClass {
    Individual,
    Business,
}

/// Commission rates in basis points (1 bp = 0.01%).
///
/// Basis points keep the fee computation in integer arithmetic end to end;
/// `5%` is `500`, `2%` is `200`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub individual_bps: u32,
    pub business_bps: u32,
}

impl FeeSchedule {
    pub fn rate_bps(&self, class: AccountClass) -> u32 {
        match class {
            AccountClass::Individual => self.individual_bps,
            AccountClass::Business => self.business_bps,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            individual_bps: 500,
            business_bps: 200,
        }
    }
}

/// Marketplace engine configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Minimum aggregate listed value (minor units) a seller must maintain
    /// before listings become eligible for moderation and visibility.
    pub activation_threshold_cents: u64,

    /// Commission rates per account class.
    pub fees: FeeSchedule,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            activation_threshold_cents: 700,
            fees: FeeSchedule::default(),
        }
    }
}

impl MarketplaceConfig {
    /// Config with a custom activation threshold, default fees.
    pub fn with_threshold(activation_threshold_cents: u64) -> Self {
        Self {
            activation_threshold_cents,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_marketplace_policy() {
        let cfg = MarketplaceConfig::default();
        assert_eq!(cfg.activation_threshold_cents, 700);
        assert_eq!(cfg.fees.rate_bps(AccountClass::Individual), 500);
        assert_eq!(cfg.fees.rate_bps(AccountClass::Business), 200);
    }

    #[test]
    fn threshold_override() {
        let cfg = MarketplaceConfig::with_threshold(1_000);
        assert_eq!(cfg.activation_threshold_cents, 1_000);
        assert_eq!(cfg.fees, FeeSchedule::default());
    }
}
