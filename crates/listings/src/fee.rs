//! Commission computation.

use serde::{Deserialize, Serialize};

use bindery_core::{AccountClass, FeeSchedule, ValueObject};

/// The split of a listing price into marketplace commission and seller payout.
///
/// Invariant: `fee_cents + net_cents == price_cents` for the price the value
/// was computed from. The split is derived at write time and stored on the
/// listing, so historical listings keep the rate they were created under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub fee_cents: u64,
    pub net_cents: u64,
}

impl ValueObject for FeeBreakdown {}

impl FeeBreakdown {
    /// Split `price_cents` at `rate_bps` basis points, rounding the fee
    /// half-up.
    pub fn compute(price_cents: u64, rate_bps: u32) -> Self {
        let fee_cents = (price_cents * u64::from(rate_bps) + 5_000) / 10_000;
        Self {
            fee_cents,
            net_cents: price_cents - fee_cents,
        }
    }

    /// Split `price_cents` using the schedule rate for `class`.
    pub fn for_class(price_cents: u64, schedule: &FeeSchedule, class: AccountClass) -> Self {
        Self::compute(price_cents, schedule.rate_bps(class))
    }

    pub fn total(&self) -> u64 {
        self.fee_cents + self.net_cents
    }
}
