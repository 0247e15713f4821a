//! Ledger HTTP API page source
//!
//! ## API Reference
//!
//! Endpoint: `{base}/data/lines?page_size={n}&offset={offset}&token={token}`
//!
//! Returns:
//! ```json
//! { "data": [ {"id": "...", "amount": 120, "account_id": "..."} ],
//!   "page": {"offset": 3, "has_more": true} }
//! ```

use crate::config::Config;
use crate::ledger::types::Page;
use crate::source::page_source::{FetchError, PageSource};
use async_trait::async_trait;
use std::time::Duration;

/// reqwest-backed page source
///
/// One client is shared by every worker; reqwest pools connections
/// internally so cloning the source is not required.
pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
    token: Option<String>,
}

impl HttpPageSource {
    pub fn new(
        base_url: impl Into<String>,
        page_size: u32,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.source_url.clone(),
            config.page_size,
            config.token.clone(),
            config.http_timeout,
        )
    }

    /// Build the request URL for one offset
    ///
    /// Query values are form-encoded, so a token containing `&`, `=` or
    /// spaces stays a single `token` parameter.
    pub fn page_url(&self, offset: u64) -> Result<reqwest::Url, FetchError> {
        let page_size = self.page_size.to_string();
        let offset_str = offset.to_string();

        let mut params = vec![("page_size", page_size.as_str()), ("offset", offset_str.as_str())];
        if let Some(token) = &self.token {
            params.push(("token", token.as_str()));
        }

        reqwest::Url::parse_with_params(&format!("{}/data/lines", self.base_url), &params).map_err(
            |e| FetchError::Transport {
                offset,
                message: format!("invalid source URL: {}", e),
            },
        )
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, offset: u64) -> Result<Page, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            offset,
            message: e.to_string(),
        };

        log::debug!("fetching offset {}", offset);
        let response = self
            .client
            .get(self.page_url(offset)?)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                offset,
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;

        log::debug!("parsing results for offset {}", offset);
        serde_json::from_slice::<Page>(&body).map_err(|source| FetchError::Decode { offset, source })
    }

    fn source_type(&self) -> &'static str {
        "HTTP"
    }
}
