//! Remote submission sink
//!
//! POSTs the compact JSON payload to the submission endpoint. Anything but
//! `200 OK` is a fatal outcome and carries the endpoint's response body so
//! the operator can see why it was rejected.

use crate::emit::sink_backend::{ResultPayload, ResultSink, SinkError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;

pub struct RemoteSink {
    client: reqwest::Client,
    url: reqwest::Url,
    echo_response: bool,
    last_response: Option<String>,
}

impl RemoteSink {
    /// The token is form-encoded into the query, after any parameters the
    /// URL already carries.
    pub fn new(url: &str, token: Option<&str>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut url = reqwest::Url::parse(url)
            .map_err(|e| SinkError::Misconfigured(format!("invalid submit URL {}: {}", url, e)))?;
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("token", token);
        }

        Ok(Self {
            client,
            url,
            echo_response: true,
            last_response: None,
        })
    }

    /// Whether a successful response body is copied to stdout (default: true)
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_response = echo;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Body of the last successful submission
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }
}

#[async_trait]
impl ResultSink for RemoteSink {
    async fn emit(&mut self, payload: &ResultPayload) -> Result<(), SinkError> {
        let body = payload.to_compact()?;

        log::info!("📤 Submitting aggregate ({} bytes)", body.len());
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            log::error!("❌ Submission rejected: {}", status);
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        log::info!("✅ Submission accepted: {}", status);
        if self.echo_response {
            println!("{}", text);
        }
        self.last_response = Some(text);
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "remote"
    }
}
