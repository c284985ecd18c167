//! Catalog read port.
//!
//! The product catalog is maintained by scheduled import jobs outside this
//! engine; the engine only reads it. Search classification itself is pure
//! domain logic in `bindery-catalog` - implementations apply it to whatever
//! storage they front.

use std::sync::{Arc, RwLock};

use bindery_catalog::{Card, CardFilter, SearchQuery};
use bindery_core::CardId;

use crate::store::StoreError;

/// Read-only catalog port.
pub trait CatalogReader: Send + Sync {
    /// Cards matching the structural query (if any) and the filter.
    fn search(&self, query: Option<&SearchQuery>, filter: &CardFilter)
        -> Result<Vec<Card>, StoreError>;

    /// Lookup by id set. Unknown ids are skipped, not errors.
    fn by_ids(&self, ids: &[CardId]) -> Result<Vec<Card>, StoreError>;

    /// Name suggestions: free text matches card name *or* parent group
    /// name; structured number queries behave like [`Self::search`].
    /// Results are name-ordered and capped at `limit`.
    fn suggest(&self, text: &str, limit: usize) -> Result<Vec<Card>, StoreError>;
}

impl<C> CatalogReader for Arc<C>
where
    C: CatalogReader + ?Sized,
{
    fn search(
        &self,
        query: Option<&SearchQuery>,
        filter: &CardFilter,
    ) -> Result<Vec<Card>, StoreError> {
        (**self).search(query, filter)
    }

    fn by_ids(&self, ids: &[CardId]) -> Result<Vec<Card>, StoreError> {
        (**self).by_ids(ids)
    }

    fn suggest(&self, text: &str, limit: usize) -> Result<Vec<Card>, StoreError> {
        (**self).suggest(text, limit)
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    cards: RwLock<Vec<Card>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: RwLock::new(cards),
        }
    }

    pub fn add(&self, card: Card) {
        if let Ok(mut cards) = self.cards.write() {
            cards.push(card);
        }
    }

    fn read(&self) -> Result<Vec<Card>, StoreError> {
        self.cards
            .read()
            .map(|c| c.clone())
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

impl CatalogReader for InMemoryCatalog {
    fn search(
        &self,
        query: Option<&SearchQuery>,
        filter: &CardFilter,
    ) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|card| filter.matches(card))
            .filter(|card| query.is_none_or(|q| q.matches(card)))
            .collect())
    }

    fn by_ids(&self, ids: &[CardId]) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|card| ids.contains(&card.id))
            .collect())
    }

    fn suggest(&self, text: &str, limit: usize) -> Result<Vec<Card>, StoreError> {
        let query = SearchQuery::classify(text);
        let mut hits: Vec<Card> = self
            .read()?
            .into_iter()
            .filter(|card| query.matches_suggestion(card))
            .collect();
        hits.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        hits.truncate(limit);
        Ok(hits)
    }
}
