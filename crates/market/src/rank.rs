//! The pure ranking pipeline: join, score, filter, sort, paginate.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bindery_catalog::Card;
use bindery_core::CardId;

use crate::query::{MarketQuery, MarketTab, Page};
use crate::stats::MarketStat;
use crate::telemetry::TelemetryCounts;

/// A catalog card decorated with market and popularity data for one query.
///
/// Ephemeral - built per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCard {
    pub card: Card,
    pub offers_count: u64,
    pub min_price_cents: Option<u64>,
    pub avg_price_cents: Option<u64>,
    pub score_popular: u64,
}

/// Weighted popularity score: active offers weigh double, purchase intent
/// (buy clicks) triple, plain views single.
fn popularity_score(offers_count: u64, counts: TelemetryCounts) -> u64 {
    offers_count * 2 + counts.views + counts.clicks * 3
}

/// Join the three per-card maps, apply post-join filters, sort by tab, and
/// paginate.
///
/// `cards` is expected to be pre-filtered by the catalog (structural search
/// + group/rarity/supertype); this function owns everything that needs the
/// joined view. Missing stats or telemetry for a card mean zero, never an
/// error.
pub fn rank(
    cards: Vec<Card>,
    stats: &HashMap<CardId, MarketStat>,
    telemetry: &HashMap<CardId, TelemetryCounts>,
    query: &MarketQuery,
) -> Page<RankedCard> {
    let mut rows: Vec<RankedCard> = cards
        .into_iter()
        .map(|card| {
            let stat = stats.get(&card.id);
            let counts = telemetry.get(&card.id).copied().unwrap_or_default();
            let offers_count = stat.map_or(0, |s| s.offers_count);
            RankedCard {
                offers_count,
                min_price_cents: stat.and_then(|s| s.min_price_cents),
                avg_price_cents: stat.and_then(|s| s.avg_price_cents),
                score_popular: popularity_score(offers_count, counts),
                card,
            }
        })
        .collect();

    rows.retain(|row| passes_post_join_filters(row, query));
    sort_rows(&mut rows, query.tab);

    Page::paginate(rows, query.page, query.page_size)
}

fn passes_post_join_filters(row: &RankedCard, query: &MarketQuery) -> bool {
    if query.only_with_listings && row.offers_count == 0 {
        return false;
    }

    let price_bounded = query.price_min_cents.is_some() || query.price_max_cents.is_some();
    if price_bounded {
        // A card with no asking price cannot satisfy a price bound.
        let Some(min_price) = row.min_price_cents else {
            return false;
        };
        if query.price_min_cents.is_some_and(|min| min_price < min) {
            return false;
        }
        if query.price_max_cents.is_some_and(|max| min_price > max) {
            return false;
        }
    }

    true
}

fn sort_rows(rows: &mut [RankedCard], tab: MarketTab) {
    rows.sort_by(|a, b| {
        let primary = match tab {
            MarketTab::Popular => b
                .score_popular
                .cmp(&a.score_popular)
                .then_with(|| b.offers_count.cmp(&a.offers_count)),
            MarketTab::MostListed => b
                .offers_count
                .cmp(&a.offers_count)
                .then_with(|| price_asc(a.min_price_cents, b.min_price_cents)),
            MarketTab::LowestPrice => price_asc(a.min_price_cents, b.min_price_cents),
            MarketTab::HighestPrice => price_desc(a.min_price_cents, b.min_price_cents),
        };
        primary.then_with(|| by_name(a, b))
    });
}

/// Ascending by price; cards with no price sort last.
fn price_asc(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by price; no price is treated as the lowest value.
fn price_desc(a: Option<u64>, b: Option<u64>) -> Ordering {
    b.unwrap_or(0).cmp(&a.unwrap_or(0))
}

/// Final alphabetical tiebreak, case-insensitive.
fn by_name(a: &RankedCard, b: &RankedCard) -> Ordering {
    a.card
        .name
        .to_lowercase()
        .cmp(&b.card.name.to_lowercase())
}
