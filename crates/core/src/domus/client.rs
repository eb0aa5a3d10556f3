//! HTTP client for the Domus listing API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::sync::ports::{FetchError, ListingSource};
use crate::sync::DEFAULT_PAGE_SIZE;

/// Configuration for the Domus client.
#[derive(Debug, Clone)]
pub struct DomusConfig {
    /// Listing endpoint (e.g. "https://apiv3get.domus.la/inmuebles/lista").
    pub base_url: String,
    /// API access token, sent as the `token` query parameter.
    pub token: String,
    /// Fixed status filter sent as `estado`.
    pub status_filter: String,
    /// Records requested per page. Must match `SyncOptions::page_size` or the
    /// runner's short-page termination check misfires.
    pub page_size: usize,
    /// Timeout for each page request.
    pub timeout: Duration,
}

impl Default for DomusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apiv3get.domus.la/inmuebles/lista".to_string(),
            token: String::new(),
            status_filter: "Disponible".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Page envelope returned by the listing endpoint. A response without the
/// list field counts as an empty page.
#[derive(Debug, Deserialize)]
struct ListingsPage {
    #[serde(default)]
    inmuebles: Vec<Value>,
}

/// Thin reqwest wrapper speaking the Domus query contract.
pub struct DomusClient {
    http: reqwest::Client,
    config: DomusConfig,
}

impl DomusClient {
    pub fn new(config: DomusConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ListingSource for DomusClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("token", self.config.token.as_str()),
                ("estado", self.config.status_filter.as_str()),
            ])
            .query(&[("limit", self.config.page_size as u64), ("page", u64::from(page))])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    FetchError::Transport("request timed out".to_string())
                } else {
                    // reqwest's Display embeds the request URL, token included;
                    // strip it before the message can reach a log or response.
                    FetchError::Transport(err.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: ListingsPage = response
            .json()
            .await
            .map_err(|err| FetchError::Malformed(err.without_url().to_string()))?;

        debug!(page, count = body.inmuebles.len(), "page fetched");
        Ok(body.inmuebles)
    }
}
