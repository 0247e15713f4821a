//! Concurrent pagination engine
//!
//! ## Flow
//!
//! 1. `OffsetDispatcher` seeds the dispatch channel with one offset per worker
//! 2. Each fetch worker pulls an offset, fetches the page, and forwards the
//!    entries as one `PageBatch` (or stops on an empty page)
//! 3. The coordinator folds batches into `LedgerAggregator` and dispatches
//!    exactly one new offset per consumed batch
//! 4. `CompletionDetector` counts worker exits; the run ends when every
//!    worker has exited
//!
//! The source's `has_more` flag is never used to stop: it is known to turn
//! false before the end of data. An empty page is the only stop signal,
//! which means each still-active worker may fetch one page past the end.

pub mod completion;
pub mod coordinator;
pub mod dispatcher;
pub mod worker;

pub use completion::{CompletionDetector, StopReason, WorkerExit, WorkerOutcome, WorkerSummary};
pub use coordinator::{run_pagination, EngineError, RunReport, RunStats};
pub use dispatcher::OffsetDispatcher;
pub use worker::{fetch_worker, PageBatch};
