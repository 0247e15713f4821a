//! Sink trait for the final aggregate
//!
//! Defines the interface for delivering the account totals to stdout, a
//! file, or the remote submission endpoint.

use crate::ledger::aggregator::AccountAggregate;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Submission request could not be sent or its response read
    Transport(String),
    /// Submission endpoint answered with something other than 200
    Rejected { status: u16, body: String },
    Misconfigured(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Transport(err.to_string())
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "IO error: {}", e),
            SinkError::Serialization(e) => write!(f, "Error marshaling: {}", e),
            SinkError::Transport(e) => write!(f, "Error posting: {}", e),
            SinkError::Rejected { status, body } => write!(f, "Bad status: {} ({})", status, body),
            SinkError::Misconfigured(msg) => write!(f, "Sink misconfigured: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}

/// Serialized aggregate, rendered once and shared by every sink
///
/// Shape: `{"<account_id>": {"line_count": n, "total_amount": n}}`,
/// optionally wrapped as `{"<key>": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPayload {
    body: Value,
}

impl ResultPayload {
    pub fn new(
        accounts: &BTreeMap<String, AccountAggregate>,
        result_key: Option<&str>,
    ) -> Result<Self, SinkError> {
        let inner = serde_json::to_value(accounts)?;

        let body = match result_key {
            Some(key) => {
                let mut wrapper = Map::new();
                wrapper.insert(key.to_string(), inner);
                Value::Object(wrapper)
            }
            None => inner,
        };

        Ok(Self { body })
    }

    pub fn as_value(&self) -> &Value {
        &self.body
    }

    pub fn to_pretty(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string_pretty(&self.body)?)
    }

    pub fn to_compact(&self) -> Result<Vec<u8>, SinkError> {
        Ok(serde_json::to_vec(&self.body)?)
    }
}

/// Backend trait for delivering the final aggregate
#[async_trait]
pub trait ResultSink: Send {
    /// Deliver the payload; any error is fatal for the run
    async fn emit(&mut self, payload: &ResultPayload) -> Result<(), SinkError>;

    /// Get sink type for logging
    fn sink_type(&self) -> &'static str;
}
