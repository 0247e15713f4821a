//! # ledgerflow
//!
//! Concurrent pagination-and-aggregation engine for remote ledger data.
//!
//! ## Architecture
//!
//! ```text
//! OffsetDispatcher ──offsets──▶ fetch workers (pool of N) ──▶ PageSource
//!        ▲                              │
//!        │                       entry batches / exits
//!        │                              ▼
//!        └──────────── coordinator (LedgerAggregator + CompletionDetector)
//!                                       │
//!                                       ▼
//!                               ResultEmitter → stdout / file / remote
//! ```
//!
//! The coordinator is the single owner of the aggregate map and of the
//! offset cursor. Workers only ever receive offsets and hand back pages.
//!
//! ## Module Organization
//!
//! - `config` - Environment and command line configuration
//! - `ledger` - Entry/page types and the per-account aggregator
//! - `source` - Page source trait and the reqwest-backed implementation
//! - `engine` - Dispatcher, workers, completion detection, run loop
//! - `emit` - Result sinks (stdout, file, remote submission)

pub mod config;
pub mod emit;
pub mod engine;
pub mod ledger;
pub mod source;

pub use config::{Config, ConfigError, SinkKind};
pub use emit::{ResultEmitter, ResultSink, SinkError};
pub use engine::{run_pagination, EngineError, RunReport, RunStats};
pub use ledger::{AccountAggregate, Entry, LedgerAggregator, Page, PageInfo};
pub use source::{FetchError, HttpPageSource, PageSource};
