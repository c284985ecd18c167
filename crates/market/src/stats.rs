//! Per-card market aggregates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bindery_core::CardId;
use bindery_listings::Listing;

/// Aggregate over the currently visible (`active`) listings of one card.
///
/// Derived, never a source of truth: a listing that is edited, rejected, or
/// deleted drops out the next time the fold runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStat {
    pub card_id: CardId,
    pub offers_count: u64,
    pub min_price_cents: Option<u64>,
    pub avg_price_cents: Option<u64>,
}

impl MarketStat {
    fn empty(card_id: CardId) -> Self {
        Self {
            card_id,
            offers_count: 0,
            min_price_cents: None,
            avg_price_cents: None,
        }
    }
}

/// Fold listings into per-card market stats.
///
/// Only `active` listings contribute; everything else is invisible to the
/// marketplace. The average rounds to the nearest cent.
pub fn compute_market_stats<'a>(
    listings: impl IntoIterator<Item = &'a Listing>,
) -> HashMap<CardId, MarketStat> {
    let mut sums: HashMap<CardId, (u64, u64, u64)> = HashMap::new();

    for listing in listings {
        if !listing.status.is_visible() {
            continue;
        }
        let entry = sums.entry(listing.card_id).or_insert((0, 0, u64::MAX));
        entry.0 += 1;
        entry.1 += listing.price_cents;
        entry.2 = entry.2.min(listing.price_cents);
    }

    sums.into_iter()
        .map(|(card_id, (count, total, min))| {
            let mut stat = MarketStat::empty(card_id);
            stat.offers_count = count;
            stat.min_price_cents = Some(min);
            stat.avg_price_cents = Some((total + count / 2) / count);
            (card_id, stat)
        })
        .collect()
}
