use crate::emit::sink_backend::{ResultPayload, ResultSink, SinkError};
use async_trait::async_trait;
use std::io::{self, Write};

/// Writes the pretty-printed payload to a byte stream (stdout by default)
pub struct StreamSink<W: Write + Send> {
    out: W,
}

impl StreamSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> StreamSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for StreamSink<W> {
    async fn emit(&mut self, payload: &ResultPayload) -> Result<(), SinkError> {
        let json = payload.to_pretty()?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()?;
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "stdout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::aggregator::AccountAggregate;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_writes_pretty_json_line() {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            "acct".to_string(),
            AccountAggregate {
                line_count: 2,
                total_amount: 10,
            },
        );
        let payload = ResultPayload::new(&accounts, Some("result")).unwrap();

        let mut sink = StreamSink::new(Vec::new());
        sink.emit(&payload).await.unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\n  \"result\": {"));

        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(&parsed, payload.as_value());
    }
}
