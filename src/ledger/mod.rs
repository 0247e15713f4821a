//! Ledger data model and the per-account aggregator
//!
//! - `types` - Wire types decoded from the page source (Entry, Page)
//! - `aggregator` - Single-writer fold of entries into account totals

pub mod aggregator;
pub mod types;

pub use aggregator::{AccountAggregate, LedgerAggregator};
pub use types::{Entry, Page, PageInfo};
