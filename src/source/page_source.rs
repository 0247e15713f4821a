//! Page source trait for the fetch workers
//!
//! Every failure a source can report is fatal for the run: there is no
//! retry at this layer and workers do not attempt to recover.

use crate::ledger::types::Page;
use async_trait::async_trait;

#[derive(Debug)]
pub enum FetchError {
    /// Source unreachable, connection dropped, or request timed out
    Transport { offset: u64, message: String },
    /// Source answered with a non-success HTTP status
    Status { offset: u64, status: u16 },
    /// Response body is not a valid page payload
    Decode { offset: u64, source: serde_json::Error },
}

impl FetchError {
    pub fn offset(&self) -> u64 {
        match self {
            FetchError::Transport { offset, .. }
            | FetchError::Status { offset, .. }
            | FetchError::Decode { offset, .. } => *offset,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport { offset, message } => {
                write!(f, "Source appears to be down (offset {}): {}", offset, message)
            }
            FetchError::Status { offset, status } => {
                write!(f, "Source returned HTTP {} (offset {})", status, offset)
            }
            FetchError::Decode { offset, source } => {
                write!(f, "Page payload appears to be corrupt (offset {}): {}", offset, source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Source of ledger pages addressed by offset
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch and decode the page at `offset`
    async fn fetch_page(&self, offset: u64) -> Result<Page, FetchError>;

    /// Get source type for logging
    fn source_type(&self) -> &'static str;
}
