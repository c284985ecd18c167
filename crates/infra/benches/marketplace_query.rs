use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;

use bindery_catalog::{Card, CollectorNumber, Rarity, Supertype};
use bindery_core::{AccountClass, CardId, FeeSchedule, ListingId, MarketplaceConfig, SellerId};
use bindery_listings::{
    plan, Condition, CreateListing, Finish, Language, Listing, ListingStatus,
};
use bindery_market::{compute_market_stats, rank, MarketQuery, MarketTab, TelemetryCounts};

use std::collections::HashMap;

fn synthetic_card(i: usize) -> Card {
    Card {
        id: CardId::new(),
        name: format!("Card {i:05}"),
        group_name: format!("Set {}", i % 12),
        rarity: Rarity::Rare,
        supertype: Supertype::Creature,
        collector_number: Some(CollectorNumber::new(&format!("{}", i % 200 + 1))),
        printed_total: Some(200),
        released_at: Utc::now(),
    }
}

fn synthetic_listing(card_id: CardId, seller_id: SellerId, price_cents: u64) -> Listing {
    let cmd = CreateListing {
        seller_id,
        card_id,
        price_cents,
        quantity: 1,
        condition: Condition::NearMint,
        language: Language::English,
        finish: Finish::Normal,
        notes: None,
        account_class: AccountClass::Individual,
        occurred_at: Utc::now(),
    };
    let mut listing = cmd
        .into_listing(ListingId::new(), ListingStatus::PendingReview, &FeeSchedule::default())
        .unwrap();
    listing.status = ListingStatus::Active;
    listing
}

/// One query over a pre-joined dataset: score + filter + sort + paginate.
fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for &size in &[100usize, 1_000, 5_000] {
        let cards: Vec<Card> = (0..size).map(synthetic_card).collect();
        let listings: Vec<Listing> = cards
            .iter()
            .enumerate()
            .flat_map(|(i, card)| {
                (0..(i % 4)).map(move |j| {
                    synthetic_listing(card.id, SellerId::new(), 100 + (i * 7 + j * 13) as u64)
                })
            })
            .collect();
        let stats = compute_market_stats(&listings);
        let telemetry: HashMap<CardId, TelemetryCounts> = cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                (
                    card.id,
                    TelemetryCounts {
                        views: (i % 50) as u64,
                        clicks: (i % 7) as u64,
                    },
                )
            })
            .collect();
        let query = MarketQuery::for_tab(MarketTab::Popular);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                rank(
                    black_box(cards.clone()),
                    black_box(&stats),
                    black_box(&telemetry),
                    black_box(&query),
                )
            })
        });
    }

    group.finish();
}

/// Folding active listings into per-card stats.
fn bench_market_stats(c: &mut Criterion) {
    let cards: Vec<Card> = (0..1_000).map(synthetic_card).collect();
    let listings: Vec<Listing> = cards
        .iter()
        .enumerate()
        .flat_map(|(i, card)| {
            (0..3).map(move |j| {
                synthetic_listing(card.id, SellerId::new(), 100 + (i * 3 + j) as u64)
            })
        })
        .collect();

    c.bench_function("compute_market_stats/3000", |b| {
        b.iter(|| compute_market_stats(black_box(&listings)))
    });
}

/// Reconciliation planning for one large seller.
fn bench_reconcile_plan(c: &mut Criterion) {
    let config = MarketplaceConfig::default();
    let seller = SellerId::new();
    let listings: Vec<Listing> = (0..500)
        .map(|i| {
            let mut l = synthetic_listing(CardId::new(), seller, 50 + i as u64);
            l.status = if i % 3 == 0 {
                ListingStatus::PendingMinimum
            } else {
                ListingStatus::PendingReview
            };
            l
        })
        .collect();

    c.bench_function("reconcile_plan/500", |b| {
        b.iter(|| plan(black_box(&listings), config.activation_threshold_cents))
    });
}

criterion_group!(benches, bench_rank, bench_market_stats, bench_reconcile_plan);
criterion_main!(benches);
