use crate::engine::completion::{StopReason, WorkerExit, WorkerOutcome, WorkerSummary};
use crate::ledger::types::Entry;
use crate::source::page_source::{FetchError, PageSource};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Entries of one non-empty page, forwarded as a unit
#[derive(Debug, Clone)]
pub struct PageBatch {
    pub worker_id: usize,
    pub offset: u64,
    pub entries: Vec<Entry>,
}

/// Sends the worker's completion signal when dropped
///
/// Covers every exit path, including unwinding and task abort, so the
/// coordinator always sees exactly one `WorkerExit` per worker.
struct CompletionGuard {
    worker_id: usize,
    done: mpsc::Sender<WorkerExit>,
    outcome: Option<WorkerOutcome>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(WorkerOutcome::Panicked);
        let exit = WorkerExit {
            worker_id: self.worker_id,
            outcome,
        };

        // Capacity equals pool size and each worker sends once, so this
        // only fails when the coordinator has already gone away
        if self.done.try_send(exit).is_err() {
            log::debug!("worker {}: completion channel closed", self.worker_id);
        } else {
            log::debug!("worker {}: sent done notification", self.worker_id);
        }
    }
}

/// Fetch worker: pull offsets until an empty page, forwarding each batch
///
/// Runs as one of N symmetric tasks. Fatal fetch errors are reported through
/// the completion channel rather than by terminating the process.
pub async fn fetch_worker(
    worker_id: usize,
    source: Arc<dyn PageSource>,
    offsets: Arc<Mutex<mpsc::Receiver<u64>>>,
    results: mpsc::Sender<PageBatch>,
    done: mpsc::Sender<WorkerExit>,
) {
    let mut guard = CompletionGuard {
        worker_id,
        done,
        outcome: None,
    };

    let outcome = match fetch_loop(worker_id, source.as_ref(), &offsets, &results).await {
        Ok(summary) => WorkerOutcome::Stopped(summary),
        Err(e) => {
            log::error!("worker {}: {}", worker_id, e);
            WorkerOutcome::Failed(e)
        }
    };
    guard.outcome = Some(outcome);
}

async fn fetch_loop(
    worker_id: usize,
    source: &dyn PageSource,
    offsets: &Mutex<mpsc::Receiver<u64>>,
    results: &mpsc::Sender<PageBatch>,
) -> Result<WorkerSummary, FetchError> {
    let mut pages_fetched = 0u64;

    loop {
        // Lock is held only while waiting for the next offset
        let next = offsets.lock().await.recv().await;
        let Some(offset) = next else {
            return Ok(WorkerSummary {
                reason: StopReason::DispatchClosed,
                pages_fetched,
                empty_pages: 0,
            });
        };

        let page = source.fetch_page(offset).await?;
        pages_fetched += 1;

        if page.flag_disagrees() {
            log::debug!(
                "worker {}: has_more={} with {} entries at offset {} (flag ignored)",
                worker_id,
                page.page.has_more,
                page.data.len(),
                offset
            );
        }

        if page.is_empty() {
            log::debug!("worker {}: empty page at offset {}, stopping", worker_id, offset);
            return Ok(WorkerSummary {
                reason: StopReason::EmptyPage { offset },
                pages_fetched,
                empty_pages: 1,
            });
        }

        for entry in &page.data {
            log::trace!(
                "offset: {}, id: {}, account: {}, amount: {}",
                offset,
                entry.id,
                entry.account_id,
                entry.amount
            );
        }

        let batch = PageBatch {
            worker_id,
            offset,
            entries: page.data,
        };

        if results.send(batch).await.is_err() {
            log::warn!("worker {}: results channel closed, stopping", worker_id);
            return Ok(WorkerSummary {
                reason: StopReason::ResultsClosed,
                pages_fetched,
                empty_pages: 0,
            });
        }
    }
}
