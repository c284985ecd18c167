//! Infrastructure layer: storage ports, external-service ports, and the
//! services that orchestrate the pure domain crates against them.

pub mod audit;
pub mod catalog_source;
pub mod lifecycle;
pub mod market_service;
pub mod notify;
pub mod reconciler;
pub mod store;
pub mod telemetry_source;

#[cfg(test)]
mod integration_tests;

pub use audit::{AuditEntry, AuditError, AuditLog, InMemoryAuditLog};
pub use catalog_source::{CatalogReader, InMemoryCatalog};
pub use lifecycle::{LifecycleError, LifecycleService};
pub use market_service::MarketplaceService;
pub use notify::{InMemoryNotifier, Notification, NotificationKind, Notifier, NotifyError};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use store::{InMemoryListingStore, ListingStore, StoreError};
pub use telemetry_source::{InMemoryTelemetry, TelemetryReader};
