//! Routes the final aggregate to every configured sink

use crate::config::{Config, SinkKind};
use crate::emit::file_sink::FileSink;
use crate::emit::remote_sink::RemoteSink;
use crate::emit::sink_backend::{ResultPayload, ResultSink, SinkError};
use crate::emit::stream_sink::StreamSink;
use crate::ledger::aggregator::AccountAggregate;
use std::collections::BTreeMap;

/// Renders the payload once and hands it to each sink in order
///
/// The first failing sink aborts emission; later sinks are not attempted.
pub struct ResultEmitter {
    sinks: Vec<Box<dyn ResultSink>>,
    result_key: Option<String>,
}

impl ResultEmitter {
    pub fn new(result_key: Option<String>) -> Self {
        Self {
            sinks: Vec::new(),
            result_key,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Create an emitter for the selected sink kind
    pub fn from_config(kind: SinkKind, config: &Config) -> Result<Self, SinkError> {
        let emitter = Self::new(config.result_key.clone());

        let emitter = match kind {
            SinkKind::Stdout => emitter.with_sink(Box::new(StreamSink::stdout())),
            SinkKind::File => {
                let path = config.output_path.as_ref().ok_or_else(|| {
                    SinkError::Misconfigured("LEDGER_OUTPUT_PATH is required for the file sink".to_string())
                })?;
                emitter.with_sink(Box::new(FileSink::new(path)))
            }
            SinkKind::Remote => emitter.with_sink(Box::new(remote_sink(config)?)),
            SinkKind::Both => emitter
                .with_sink(Box::new(StreamSink::stdout()))
                .with_sink(Box::new(remote_sink(config)?)),
        };

        Ok(emitter)
    }

    /// Serialize the aggregate and deliver it to every sink
    pub async fn emit(
        &mut self,
        accounts: &BTreeMap<String, AccountAggregate>,
    ) -> Result<(), SinkError> {
        let payload = ResultPayload::new(accounts, self.result_key.as_deref())?;

        for sink in self.sinks.iter_mut() {
            log::debug!("emitting {} accounts to {}", accounts.len(), sink.sink_type());
            sink.emit(&payload).await?;
        }

        Ok(())
    }

    /// Get sink types for logging
    pub fn sink_types(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.sink_type()).collect()
    }
}

fn remote_sink(config: &Config) -> Result<RemoteSink, SinkError> {
    let url = config.submit_url.as_ref().ok_or_else(|| {
        SinkError::Misconfigured("LEDGER_SUBMIT_URL is required for the remote sink".to_string())
    })?;
    RemoteSink::new(url, config.token.as_deref(), config.http_timeout)
}
