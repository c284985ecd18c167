//! Integration tests for the lifecycle + reconciliation + discovery stack.
//!
//! Tests: Command → LifecycleService → ListingStore → Reconciler, and
//! MarketplaceService over the same store. Everything runs against the
//! in-memory ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use chrono::{DateTime, Utc};

use bindery_catalog::{Card, CollectorNumber, Rarity, Supertype};
use bindery_core::{
    AccountClass, AdminId, CardId, DomainError, ListingId, MarketplaceConfig, SellerId,
};
use bindery_listings::{
    Condition, CreateListing, EditListing, Finish, Language, Listing, ListingStatus,
};
use bindery_market::{MarketQuery, MarketTab, TelemetryCounts, TelemetryKind, UsageEvent};

use crate::audit::InMemoryAuditLog;
use crate::catalog_source::InMemoryCatalog;
use crate::lifecycle::LifecycleService;
use crate::market_service::MarketplaceService;
use crate::notify::{InMemoryNotifier, NotificationKind};
use crate::reconciler::Reconciler;
use crate::store::{InMemoryListingStore, ListingStore, StoreError};
use crate::telemetry_source::{InMemoryTelemetry, TelemetryReader};

type Service =
    LifecycleService<Arc<InMemoryListingStore>, Arc<InMemoryNotifier>, Arc<InMemoryAuditLog>>;

struct Harness {
    store: Arc<InMemoryListingStore>,
    notifier: Arc<InMemoryNotifier>,
    audit: Arc<InMemoryAuditLog>,
    service: Service,
}

fn setup() -> Harness {
    bindery_observability::init();

    let store = Arc::new(InMemoryListingStore::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let service = LifecycleService::new(
        store.clone(),
        notifier.clone(),
        audit.clone(),
        MarketplaceConfig::default(),
    );

    Harness {
        store,
        notifier,
        audit,
        service,
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn create_cmd(seller_id: SellerId, card_id: CardId, price_cents: u64) -> CreateListing {
    CreateListing {
        seller_id,
        card_id,
        price_cents,
        quantity: 1,
        condition: Condition::NearMint,
        language: Language::English,
        finish: Finish::Normal,
        notes: None,
        account_class: AccountClass::Individual,
        occurred_at: now(),
    }
}

fn edit_cmd(listing: &Listing, price_cents: u64) -> EditListing {
    EditListing {
        listing_id: listing.id,
        seller_id: listing.seller_id,
        price_cents,
        quantity: listing.quantity,
        condition: listing.condition,
        language: listing.language,
        finish: listing.finish,
        notes: listing.notes.clone(),
        account_class: AccountClass::Individual,
        occurred_at: now(),
    }
}

/// Insert a listing directly in a given status, bypassing the service -
/// simulates rows another node wrote, or race windows.
fn seed_listing(
    store: &InMemoryListingStore,
    seller_id: SellerId,
    price_cents: u64,
    status: ListingStatus,
) -> Listing {
    let mut listing = create_cmd(seller_id, CardId::new(), price_cents)
        .into_listing(
            ListingId::new(),
            ListingStatus::PendingReview,
            &MarketplaceConfig::default().fees,
        )
        .unwrap();
    listing.status = status;
    store.insert(listing.clone()).unwrap();
    listing
}

fn card(name: &str, group: &str, number: &str) -> Card {
    Card {
        id: CardId::new(),
        name: name.to_string(),
        group_name: group.to_string(),
        rarity: Rarity::Rare,
        supertype: Supertype::Creature,
        collector_number: Some(CollectorNumber::new(number)),
        printed_total: Some(182),
        released_at: now(),
    }
}

#[test]
fn first_listing_below_threshold_is_parked() {
    let h = setup();
    let seller = SellerId::new();

    let listing = h.service.create(create_cmd(seller, CardId::new(), 500)).unwrap();
    assert_eq!(listing.status, ListingStatus::PendingMinimum);

    let sent = h.notifier.sent_to(seller);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::ListingHeld);
}

#[test]
fn crossing_threshold_promotes_earlier_listing_too() {
    let h = setup();
    let seller = SellerId::new();

    let first = h.service.create(create_cmd(seller, CardId::new(), 500)).unwrap();
    assert_eq!(first.status, ListingStatus::PendingMinimum);

    let second = h.service.create(create_cmd(seller, CardId::new(), 300)).unwrap();
    assert_eq!(second.status, ListingStatus::PendingReview);

    // 500 + 300 = 800 >= 700: reconciliation promoted the parked listing.
    let first = h.service.get(first.id).unwrap();
    assert_eq!(first.status, ListingStatus::PendingReview);

    let kinds: Vec<_> = h.notifier.sent_to(seller).iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::ListingHeld, NotificationKind::ListingReceived]
    );
}

#[test]
fn approval_above_threshold_activates() {
    let h = setup();
    let seller = SellerId::new();
    let admin = AdminId::new();

    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();
    assert_eq!(listing.status, ListingStatus::PendingReview);

    let approved = h.service.admin_approve(listing.id, admin, now()).unwrap();
    assert_eq!(approved.status, ListingStatus::Active);

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "listing.approved");
    assert_eq!(entries[0].actor, admin);

    let kinds: Vec<_> = h.notifier.sent_to(seller).iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::ListingReceived,
            NotificationKind::ListingActivated
        ]
    );
}

#[test]
fn approval_below_threshold_parks_not_rejects() {
    let h = setup();
    let seller = SellerId::new();

    // A review-pending row whose seller aggregate is 650 - the window
    // between a concurrent value drop and its reconcile pass.
    let listing = seed_listing(&h.store, seller, 650, ListingStatus::PendingReview);

    let approved = h.service.admin_approve(listing.id, AdminId::new(), now()).unwrap();
    assert_eq!(approved.status, ListingStatus::PendingMinimum);
    assert_eq!(approved.rejection_reason, None);

    let kinds: Vec<_> = h.notifier.sent_to(seller).iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::ListingApprovedHeld]);
}

#[test]
fn edit_forces_review_and_keeps_id() {
    let h = setup();
    let seller = SellerId::new();
    let admin = AdminId::new();

    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();
    let active = h.service.admin_approve(listing.id, admin, now()).unwrap();
    assert_eq!(active.status, ListingStatus::Active);

    let edited = h.service.edit(edit_cmd(&active, 1_200)).unwrap();
    assert_eq!(edited.id, listing.id);
    assert_eq!(edited.status, ListingStatus::PendingReview);
    assert_eq!(edited.price_cents, 1_200);
    assert_eq!(edited.fee_cents + edited.net_cents, 1_200);
}

#[test]
fn edit_by_stranger_is_unauthorized() {
    let h = setup();
    let seller = SellerId::new();

    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();
    let mut cmd = edit_cmd(&listing, 1_000);
    cmd.seller_id = SellerId::new();

    let err = h.service.edit(cmd).unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::Unauthorized)
    ));
}

#[test]
fn rejected_listing_resubmits_via_edit() {
    let h = setup();
    let seller = SellerId::new();

    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();
    let rejected = h
        .service
        .admin_reject(listing.id, AdminId::new(), "blurry photos", now())
        .unwrap();
    assert_eq!(rejected.status, ListingStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("blurry photos"));

    let resubmitted = h.service.edit(edit_cmd(&rejected, 900)).unwrap();
    assert_eq!(resubmitted.status, ListingStatus::PendingReview);
    assert_eq!(resubmitted.rejection_reason, None);
}

#[test]
fn reject_requires_nonempty_reason() {
    let h = setup();
    let listing = h
        .service
        .create(create_cmd(SellerId::new(), CardId::new(), 900))
        .unwrap();

    let err = h
        .service
        .admin_reject(listing.id, AdminId::new(), "  ", now())
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidReason(_))
    ));
}

#[test]
fn deleting_value_demotes_remaining_listings() {
    let h = setup();
    let seller = SellerId::new();
    let admin = AdminId::new();

    let big = h.service.create(create_cmd(seller, CardId::new(), 500)).unwrap();
    let small = h.service.create(create_cmd(seller, CardId::new(), 300)).unwrap();
    let big = h.service.admin_approve(big.id, admin, now()).unwrap();
    assert_eq!(big.status, ListingStatus::Active);

    h.service.delete(small.id, seller, now()).unwrap();

    // 500 < 700: the surviving listing drops out of the marketplace.
    let big = h.service.get(big.id).unwrap();
    assert_eq!(big.status, ListingStatus::PendingMinimum);
    assert!(h.store.list_active().unwrap().is_empty());
}

#[test]
fn delete_requires_ownership_and_existence() {
    let h = setup();
    let seller = SellerId::new();
    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();

    let err = h.service.delete(listing.id, SellerId::new(), now()).unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::Unauthorized)));

    let err = h.service.delete(ListingId::new(), seller, now()).unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NotFound)));
}

#[test]
fn concurrent_approve_and_reject_yield_one_winner() {
    let h = setup();
    let seller = SellerId::new();
    let listing = h.service.create(create_cmd(seller, CardId::new(), 900)).unwrap();
    assert_eq!(listing.status, ListingStatus::PendingReview);

    let service = Arc::new(h.service);
    let barrier = Arc::new(Barrier::new(2));

    let approve = {
        let service = service.clone();
        let barrier = barrier.clone();
        let id = listing.id;
        std::thread::spawn(move || {
            barrier.wait();
            service.admin_approve(id, AdminId::new(), Utc::now())
        })
    };
    let reject = {
        let service = service.clone();
        let barrier = barrier.clone();
        let id = listing.id;
        std::thread::spawn(move || {
            barrier.wait();
            service.admin_reject(id, AdminId::new(), "duplicate", Utc::now())
        })
    };

    let results = [approve.join().unwrap(), reject.join().unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one moderation action must win");

    let loss = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loss.as_ref().unwrap_err().as_domain(),
        Some(DomainError::InvalidTransition(_))
    ));

    // The stored status matches the winner.
    let stored = h.store.get(listing.id).unwrap().unwrap();
    match stored.status {
        ListingStatus::Active | ListingStatus::PendingMinimum => {
            assert!(results[0].is_ok());
        }
        ListingStatus::Rejected => assert!(results[1].is_ok()),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn reconciler_retries_past_transient_store_failures() {
    /// Store wrapper that fails the first N conditional updates.
    struct FlakyStore {
        inner: InMemoryListingStore,
        failures_left: AtomicUsize,
    }

    impl ListingStore for FlakyStore {
        fn insert(&self, listing: Listing) -> Result<(), StoreError> {
            self.inner.insert(listing)
        }
        fn get(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
            self.inner.get(id)
        }
        fn update_if_status(
            &self,
            listing: Listing,
            expected: ListingStatus,
        ) -> Result<Listing, StoreError> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Storage("simulated outage".to_string()));
            }
            self.inner.update_if_status(listing, expected)
        }
        fn delete(&self, id: ListingId) -> Result<Listing, StoreError> {
            self.inner.delete(id)
        }
        fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Listing>, StoreError> {
            self.inner.list_by_seller(seller_id)
        }
        fn list_by_card(&self, card_id: CardId) -> Result<Vec<Listing>, StoreError> {
            self.inner.list_by_card(card_id)
        }
        fn list_active(&self) -> Result<Vec<Listing>, StoreError> {
            self.inner.list_active()
        }
    }

    let store = Arc::new(FlakyStore {
        inner: InMemoryListingStore::new(),
        failures_left: AtomicUsize::new(2),
    });
    let seller = SellerId::new();
    seed_listing(&store.inner, seller, 500, ListingStatus::PendingMinimum);
    seed_listing(&store.inner, seller, 300, ListingStatus::PendingReview);

    let reconciler = Reconciler::new(store.clone(), MarketplaceConfig::default());
    let outcome = reconciler.reconcile(seller, now()).unwrap();

    assert_eq!(outcome.effective_value, 800);
    assert_eq!(outcome.promoted, 1);
    assert!(outcome.attempts > 1);

    // No partial end state: every live listing is counted.
    let listings = store.list_by_seller(seller).unwrap();
    assert!(listings
        .iter()
        .all(|l| l.status == ListingStatus::PendingReview));
}

#[test]
fn marketplace_query_joins_stats_and_telemetry() {
    let h = setup();
    let admin = AdminId::new();

    let ashwing = card("Ashwing", "Tempest Rising", "1");
    let bramble = card("Bramble", "Tempest Rising", "2");
    let catalog = Arc::new(InMemoryCatalog::with_cards(vec![
        ashwing.clone(),
        bramble.clone(),
    ]));
    let telemetry = Arc::new(InMemoryTelemetry::new());

    // Two active offers on Ashwing (800, 1000), one on Bramble (900).
    for (card_id, price) in [(ashwing.id, 800), (ashwing.id, 1_000), (bramble.id, 900)] {
        let listing = h
            .service
            .create(create_cmd(SellerId::new(), card_id, price))
            .unwrap();
        h.service.admin_approve(listing.id, admin, now()).unwrap();
    }
    // Bramble is hot: 5 views, 2 clicks.
    for _ in 0..5 {
        telemetry.record(UsageEvent {
            kind: TelemetryKind::CardViewed,
            card_id: bramble.id,
            occurred_at: now(),
        });
    }
    for _ in 0..2 {
        telemetry.record(UsageEvent {
            kind: TelemetryKind::BuyClicked,
            card_id: bramble.id,
            occurred_at: now(),
        });
    }

    let market = MarketplaceService::new(h.store.clone(), catalog.clone(), telemetry);

    let page = market
        .query(&MarketQuery::for_tab(MarketTab::Popular), now())
        .unwrap();
    // Bramble: 1*2 + 5 + 6 = 13; Ashwing: 2*2 = 4.
    assert_eq!(page.items[0].card.name, "Bramble");
    assert_eq!(page.items[0].score_popular, 13);
    assert_eq!(page.items[1].score_popular, 4);

    let page = market
        .query(&MarketQuery::for_tab(MarketTab::MostListed), now())
        .unwrap();
    assert_eq!(page.items[0].card.name, "Ashwing");
    assert_eq!(page.items[0].offers_count, 2);
    assert_eq!(page.items[0].min_price_cents, Some(800));

    // Structural number search narrows to one card.
    let mut query = MarketQuery::for_tab(MarketTab::Popular);
    query.search_text = Some("2/182".to_string());
    let page = market.query(&query, now()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].card.name, "Bramble");

    // Suggestions match the parent group.
    let suggested = market.suggest("tempest", 10).unwrap();
    assert_eq!(suggested.len(), 2);
}

#[test]
fn edited_listing_leaves_market_stats_immediately() {
    let h = setup();
    let seller = SellerId::new();
    let card_id = CardId::new();

    let listing = h.service.create(create_cmd(seller, card_id, 900)).unwrap();
    let active = h.service.admin_approve(listing.id, AdminId::new(), now()).unwrap();
    assert_eq!(h.store.list_active().unwrap().len(), 1);

    h.service.edit(edit_cmd(&active, 950)).unwrap();
    assert!(h.store.list_active().unwrap().is_empty());
    assert_eq!(h.store.list_by_card(card_id).unwrap().len(), 1);
}

#[test]
fn telemetry_outage_degrades_to_zero_counts() {
    struct DownTelemetry;

    impl TelemetryReader for DownTelemetry {
        fn counts_since(
            &self,
            _since: DateTime<Utc>,
        ) -> Result<HashMap<CardId, TelemetryCounts>, anyhow::Error> {
            Err(anyhow::anyhow!("telemetry backend unavailable"))
        }
    }

    let h = setup();
    let ashwing = card("Ashwing", "Tempest Rising", "1");
    let catalog = Arc::new(InMemoryCatalog::with_cards(vec![ashwing.clone()]));

    let listing = h
        .service
        .create(create_cmd(SellerId::new(), ashwing.id, 900))
        .unwrap();
    h.service.admin_approve(listing.id, AdminId::new(), now()).unwrap();

    let market = MarketplaceService::new(h.store.clone(), catalog, DownTelemetry);
    let page = market
        .query(&MarketQuery::for_tab(MarketTab::Popular), now())
        .unwrap();

    // The query still succeeds; popularity falls back to offers alone.
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].score_popular, 2);
}

#[test]
fn business_accounts_pay_the_lower_rate() {
    let h = setup();
    let mut cmd = create_cmd(SellerId::new(), CardId::new(), 1_000);
    cmd.account_class = AccountClass::Business;

    let listing = h.service.create(cmd).unwrap();
    assert_eq!(listing.fee_cents, 20);
    assert_eq!(listing.net_cents, 980);
}

#[test]
fn reject_demotes_the_sellers_remaining_listings() {
    let h = setup();
    let seller = SellerId::new();

    let first = h.service.create(create_cmd(seller, CardId::new(), 500)).unwrap();
    let second = h.service.create(create_cmd(seller, CardId::new(), 300)).unwrap();
    // Both pending review (800 >= 700).
    assert_eq!(h.service.get(first.id).unwrap().status, ListingStatus::PendingReview);

    h.service
        .admin_reject(second.id, AdminId::new(), "counterfeit suspicion", now())
        .unwrap();

    // The rejected 300 no longer counts: 500 < 700 demotes the first.
    let first = h.service.get(first.id).unwrap();
    assert_eq!(first.status, ListingStatus::PendingMinimum);

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "listing.rejected");
}
