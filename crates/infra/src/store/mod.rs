//! Listing storage port and implementations.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryListingStore;
pub use r#trait::{ListingStore, StoreError};
