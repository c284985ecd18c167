//! Marketplace query execution.
//!
//! The read path: fetch the three sources (active listings, telemetry,
//! catalog), then hand the joined maps to the pure ranking pipeline. This
//! service performs no writes, holds no locks, and tolerates staleness -
//! a just-approved listing may be absent until the next query.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use bindery_catalog::{Card, SearchQuery};
use bindery_market::{compute_market_stats, rank, MarketQuery, Page, RankedCard};

use crate::catalog_source::CatalogReader;
use crate::store::{ListingStore, StoreError};
use crate::telemetry_source::TelemetryReader;

/// Rolling window the popularity signal is computed over.
pub const TELEMETRY_WINDOW_DAYS: i64 = 7;

/// The marketplace read path.
pub struct MarketplaceService<S, C, T> {
    store: S,
    catalog: C,
    telemetry: T,
}

impl<S, C, T> MarketplaceService<S, C, T>
where
    S: ListingStore,
    C: CatalogReader,
    T: TelemetryReader,
{
    pub fn new(store: S, catalog: C, telemetry: T) -> Self {
        Self {
            store,
            catalog,
            telemetry,
        }
    }

    /// Run one marketplace query.
    ///
    /// The three reads are independent of each other; only the in-memory
    /// join below needs all of them. A telemetry failure degrades to zero
    /// counts - popularity is a best-effort signal, never a reason to fail
    /// the whole query.
    pub fn query(
        &self,
        query: &MarketQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<RankedCard>, StoreError> {
        let active = self.store.list_active()?;
        let stats = compute_market_stats(&active);

        let since = now - Duration::days(TELEMETRY_WINDOW_DAYS);
        let telemetry = match self.telemetry.counts_since(since) {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "telemetry read failed; ranking without usage signal");
                Default::default()
            }
        };

        let search = query
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SearchQuery::classify);
        let cards = self.catalog.search(search.as_ref(), &query.filter)?;

        Ok(rank(cards, &stats, &telemetry, query))
    }

    /// Search-box suggestions (name or parent group match).
    pub fn suggest(&self, text: &str, limit: usize) -> Result<Vec<Card>, StoreError> {
        self.catalog.suggest(text, limit)
    }
}
