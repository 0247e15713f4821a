use tokio::sync::mpsc;

/// Issues page offsets to the worker pool
///
/// Owned by the coordinator. Offsets are handed out exactly once each, in
/// increasing order; there is no skip or re-fetch.
pub struct OffsetDispatcher {
    next_offset: u64,
    issued: u64,
    tx: mpsc::Sender<u64>,
}

impl OffsetDispatcher {
    pub fn new(start_offset: u64, tx: mpsc::Sender<u64>) -> Self {
        Self {
            next_offset: start_offset,
            issued: 0,
            tx,
        }
    }

    /// Queue one distinct offset per worker so the whole pool starts busy
    pub async fn seed(&mut self, pool_size: usize) -> Result<(), mpsc::error::SendError<u64>> {
        for _ in 0..pool_size {
            self.advance().await?;
        }
        log::debug!("seeded {} offsets, next offset {}", pool_size, self.next_offset);
        Ok(())
    }

    /// Dispatch the next offset in sequence
    pub async fn advance(&mut self) -> Result<u64, mpsc::error::SendError<u64>> {
        let offset = self.next_offset;
        self.tx.send(offset).await?;
        self.next_offset += 1;
        self.issued += 1;
        Ok(offset)
    }

    /// Offset that the next call to `advance` will dispatch
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}
