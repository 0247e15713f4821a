use crate::source::page_source::FetchError;

/// Why a worker stopped fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Fetched a page with no entries: past the end of data
    EmptyPage { offset: u64 },
    /// Dispatch channel closed with no offsets left
    DispatchClosed,
    /// Nobody is listening for batches any more
    ResultsClosed,
}

/// Per-worker counters reported on a graceful stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub reason: StopReason,
    /// Pages fetched, including the final empty one
    pub pages_fetched: u64,
    /// 0 or 1: a worker stops at its first empty page
    pub empty_pages: u64,
}

#[derive(Debug)]
pub enum WorkerOutcome {
    Stopped(WorkerSummary),
    Failed(FetchError),
    /// The worker task unwound or was aborted before reporting
    Panicked,
}

/// Completion signal: sent exactly once by every worker as it exits
#[derive(Debug)]
pub struct WorkerExit {
    pub worker_id: usize,
    pub outcome: WorkerOutcome,
}

/// Counts completion signals until the whole pool has exited
#[derive(Debug)]
pub struct CompletionDetector {
    pool_size: usize,
    done: usize,
}

impl CompletionDetector {
    pub fn new(pool_size: usize) -> Self {
        Self { pool_size, done: 0 }
    }

    /// Record one completion signal, returning true once the pool is finished
    pub fn record(&mut self) -> bool {
        self.done += 1;
        log::debug!("done count: {}", self.done);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.done >= self.pool_size
    }

    pub fn done_count(&self) -> usize {
        self.done
    }

    pub fn remaining(&self) -> usize {
        self.pool_size.saturating_sub(self.done)
    }
}
