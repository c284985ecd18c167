//! Marketplace discovery domain module.
//!
//! Per-card market aggregates, usage-telemetry count types, and the pure
//! ranking pipeline that joins catalog, market stats, and telemetry into a
//! sorted, filtered, paginated result set. The join is a pure function over
//! three already-fetched maps; fetching (and telemetry degradation) lives in
//! the infra layer.

pub mod query;
pub mod rank;
pub mod stats;
pub mod telemetry;

pub use query::{MarketQuery, MarketTab, Page};
pub use rank::{rank, RankedCard};
pub use stats::{compute_market_stats, MarketStat};
pub use telemetry::{TelemetryCounts, TelemetryKind, UsageEvent};
