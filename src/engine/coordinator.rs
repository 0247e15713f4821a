use crate::engine::completion::{CompletionDetector, WorkerExit, WorkerOutcome};
use crate::engine::dispatcher::OffsetDispatcher;
use crate::engine::worker::{fetch_worker, PageBatch};
use crate::ledger::aggregator::{AccountAggregate, LedgerAggregator};
use crate::source::page_source::{FetchError, PageSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

#[derive(Debug)]
pub enum EngineError {
    /// A worker hit a transport or decode failure; the run is abandoned
    Fetch(FetchError),
    /// A worker exited without reporting an outcome
    WorkerPanicked { worker_id: usize },
    /// Completion channel closed before every worker reported
    PoolLost { reported: usize, pool_size: usize },
}

impl From<FetchError> for EngineError {
    fn from(err: FetchError) -> Self {
        EngineError::Fetch(err)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            EngineError::WorkerPanicked { worker_id } => {
                write!(f, "Fetch worker {} exited unexpectedly", worker_id)
            }
            EngineError::PoolLost { reported, pool_size } => {
                write!(f, "Only {} of {} fetch workers reported completion", reported, pool_size)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Fetch(e) => Some(e),
            EngineError::WorkerPanicked { .. } | EngineError::PoolLost { .. } => None,
        }
    }
}

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pool_size: usize,
    pub offsets_dispatched: u64,
    /// Non-empty pages consumed by the aggregator
    pub pages_with_entries: u64,
    /// Empty pages fetched across the pool (at most one per worker)
    pub empty_pages: u64,
    pub entries: u64,
    pub accounts: usize,
    pub completion_signals: usize,
}

/// Final aggregate plus the counters of the run that produced it
#[derive(Debug, Clone)]
pub struct RunReport {
    pub accounts: BTreeMap<String, AccountAggregate>,
    pub stats: RunStats,
}

/// Fetch every page from `source` and aggregate entries per account
///
/// Spawns `pool_size` fetch workers and runs the coordinating loop on the
/// calling task. The loop owns the aggregate and the offset cursor, and
/// waits on exactly two channels: entry batches and completion signals.
///
/// On the first fatal worker error all remaining workers are aborted and the
/// partial aggregate is discarded.
pub async fn run_pagination(
    source: Arc<dyn PageSource>,
    pool_size: usize,
    start_offset: u64,
) -> Result<RunReport, EngineError> {
    let started = Instant::now();

    log::info!("🚀 Starting pagination run");
    log::info!("   ├─ Source: {}", source.source_type());
    log::info!("   ├─ Pool size: {} workers", pool_size);
    log::info!("   └─ Start offset: {}", start_offset);

    let (offset_tx, offset_rx) = mpsc::channel::<u64>(pool_size.max(1));
    let (batch_tx, mut batch_rx) = mpsc::channel::<PageBatch>(pool_size.max(1));
    let (done_tx, mut done_rx) = mpsc::channel::<WorkerExit>(pool_size.max(1));
    let offset_rx = Arc::new(Mutex::new(offset_rx));

    // Seed before the pool starts; capacity equals pool size so this never waits
    let mut dispatcher = OffsetDispatcher::new(start_offset, offset_tx);
    if dispatcher.seed(pool_size).await.is_err() {
        log::warn!("Dispatch channel closed while seeding");
    }

    let handles: Vec<JoinHandle<()>> = (0..pool_size)
        .map(|worker_id| {
            tokio::spawn(fetch_worker(
                worker_id,
                source.clone(),
                offset_rx.clone(),
                batch_tx.clone(),
                done_tx.clone(),
            ))
        })
        .collect();
    // Workers hold the only remaining senders
    drop(batch_tx);
    drop(done_tx);
    drop(offset_rx);

    let (aggregator, mut stats) =
        match drain_until_complete(&mut dispatcher, &mut batch_rx, &mut done_rx, pool_size).await {
            Ok(drained) => drained,
            Err(e) => {
                abort_workers(&handles);
                return Err(e);
            }
        };

    stats.offsets_dispatched = dispatcher.issued();
    stats.entries = aggregator.entries_seen();
    stats.accounts = aggregator.account_count();

    if aggregator.total_line_count() != aggregator.entries_seen() {
        log::warn!(
            "⚠️  Line count mismatch: {} aggregated vs {} received",
            aggregator.total_line_count(),
            aggregator.entries_seen()
        );
    }

    log::info!("✅ Pagination complete in {}ms", started.elapsed().as_millis());
    log::info!("   ├─ Offsets dispatched: {}", stats.offsets_dispatched);
    log::info!("   ├─ Pages with entries: {}", stats.pages_with_entries);
    log::info!("   ├─ Empty pages (overshoot): {}", stats.empty_pages);
    log::info!("   ├─ Entries: {}", stats.entries);
    log::info!("   └─ Accounts: {}", stats.accounts);

    Ok(RunReport {
        accounts: aggregator.into_accounts(),
        stats,
    })
}

/// Coordinating loop: fold batches and count exits until every worker is done
///
/// Exits are polled before batches. A fatal exit therefore ends the run
/// even while batches are still queued, and no further offset is
/// dispatched after it. Queued offsets plus in-flight fetches plus
/// unconsumed batches always equal the number of active workers, so no
/// batch can still be queued once the last worker has exited.
async fn drain_until_complete(
    dispatcher: &mut OffsetDispatcher,
    batch_rx: &mut mpsc::Receiver<PageBatch>,
    done_rx: &mut mpsc::Receiver<WorkerExit>,
    pool_size: usize,
) -> Result<(LedgerAggregator, RunStats), EngineError> {
    let mut aggregator = LedgerAggregator::new();
    let mut detector = CompletionDetector::new(pool_size);
    let mut stats = RunStats {
        pool_size,
        ..Default::default()
    };

    while !detector.is_finished() {
        tokio::select! {
            biased;

            exit = done_rx.recv() => {
                let Some(exit) = exit else {
                    // Guards always report, so this only happens if a task vanished
                    return Err(EngineError::PoolLost {
                        reported: detector.done_count(),
                        pool_size,
                    });
                };

                match exit.outcome {
                    WorkerOutcome::Stopped(summary) => {
                        stats.empty_pages += summary.empty_pages;
                        log::debug!(
                            "worker {} finished: {:?} after {} pages",
                            exit.worker_id,
                            summary.reason,
                            summary.pages_fetched
                        );
                        detector.record();
                    }
                    WorkerOutcome::Failed(e) => {
                        log::error!("❌ Worker {} failed, aborting run: {}", exit.worker_id, e);
                        return Err(EngineError::Fetch(e));
                    }
                    WorkerOutcome::Panicked => {
                        log::error!("❌ Worker {} exited unexpectedly, aborting run", exit.worker_id);
                        return Err(EngineError::WorkerPanicked { worker_id: exit.worker_id });
                    }
                }
            }

            Some(batch) = batch_rx.recv() => {
                log::debug!(
                    "batch from worker {}: offset {} ({} entries)",
                    batch.worker_id,
                    batch.offset,
                    batch.entries.len()
                );
                aggregator.add_batch(batch.entries);
                stats.pages_with_entries += 1;

                // One new offset per consumed batch
                if let Err(e) = dispatcher.advance().await {
                    log::warn!("No workers left to receive offset {}", e.0);
                }
            }
        }
    }

    stats.completion_signals = detector.done_count();
    Ok((aggregator, stats))
}

fn abort_workers(handles: &[JoinHandle<()>]) {
    for handle in handles {
        handle.abort();
    }
}
