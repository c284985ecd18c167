use std::collections::HashMap;
use std::sync::RwLock;

use bindery_core::{CardId, ListingId, SellerId};
use bindery_listings::{Listing, ListingStatus};

use super::r#trait::{ListingStore, StoreError};

/// In-memory listing store.
///
/// Intended for tests/dev. The write lock is held across the check and the
/// set of `update_if_status`, which gives the same exactly-one-winner
/// semantics a relational backend provides with a conditional `UPDATE`.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    rows: RwLock<HashMap<ListingId, Listing>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored listings (test convenience).
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ListingStore for InMemoryListingStore {
    fn insert(&self, listing: Listing) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        if rows.contains_key(&listing.id) {
            return Err(StoreError::Conflict(format!(
                "listing {} already exists",
                listing.id
            )));
        }
        rows.insert(listing.id, listing);
        Ok(())
    }

    fn get(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows.get(&id).cloned())
    }

    fn update_if_status(
        &self,
        listing: Listing,
        expected_status: ListingStatus,
    ) -> Result<Listing, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let current = rows.get(&listing.id).ok_or(StoreError::NotFound)?;
        if current.status != expected_status {
            return Err(StoreError::Conflict(format!(
                "expected {:?}, found {:?}",
                expected_status, current.status
            )));
        }

        rows.insert(listing.id, listing.clone());
        Ok(listing)
    }

    fn delete(&self, id: ListingId) -> Result<Listing, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        rows.remove(&id).ok_or(StoreError::NotFound)
    }

    fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Listing>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows
            .values()
            .filter(|l| l.seller_id == seller_id)
            .cloned()
            .collect())
    }

    fn list_by_card(&self, card_id: CardId) -> Result<Vec<Listing>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows
            .values()
            .filter(|l| l.card_id == card_id)
            .cloned()
            .collect())
    }

    fn list_active(&self) -> Result<Vec<Listing>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows
            .values()
            .filter(|l| l.status.is_visible())
            .cloned()
            .collect())
    }
}
