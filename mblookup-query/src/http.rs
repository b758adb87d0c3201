//! HTTP fetcher for the catalog web service.
//!
//! Builds a [`reqwest::Client`] with an identifying User-Agent and serves
//! result pages from the JSON search endpoints
//! (`{base_url}{entity}?query=…&limit=…&offset=…&fmt=json`). Requests from
//! one fetcher are paced to respect the service's rate limit.

use std::num::NonZeroU8;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::fetcher::{Page, RemoteFetcher};
use crate::types::CatalogEntity;

/// Build a [`reqwest::Client`] for catalog requests.
///
/// The client has:
/// - Timeout from config
/// - The configured User-Agent (the service blocks anonymous clients)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`QueryError::Config`] if the client cannot be constructed.
pub fn build_client(config: &QueryConfig) -> Result<reqwest::Client, QueryError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| QueryError::Config(format!("failed to build HTTP client: {e}")))
}

/// [`RemoteFetcher`] backed by the catalog's JSON search API.
///
/// Share one fetcher (behind an `Arc`) between result sets so that
/// request pacing applies across all of them.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Create a fetcher from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if `config` is invalid.
    pub fn new(config: &QueryConfig) -> Result<Self, QueryError> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url()?,
            request_interval: Duration::from_millis(config.request_interval_ms),
            last_request: Mutex::new(None),
        })
    }

    /// The full request URL for one page.
    pub fn endpoint(
        &self,
        url_extension: &str,
        limit: NonZeroU8,
        offset: usize,
        filter_parameters: &str,
    ) -> Result<Url, QueryError> {
        let mut url = self
            .base_url
            .join(url_extension)
            .map_err(|e| QueryError::Config(format!("invalid endpoint {url_extension:?}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("query", filter_parameters)
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("fmt", "json");
        Ok(url)
    }

    /// Wait until `request_interval` has passed since the previous request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.request_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    wait_ms = u64::try_from(ready_at.saturating_duration_since(Instant::now()).as_millis())
                        .unwrap_or(u64::MAX),
                    "pacing catalog request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl<T> RemoteFetcher<T> for HttpFetcher
where
    T: CatalogEntity + Send,
{
    async fn fetch(
        &self,
        url_extension: &str,
        limit: NonZeroU8,
        offset: usize,
        filter_parameters: &str,
    ) -> Result<Page<T>, QueryError> {
        let url = self.endpoint(url_extension, limit, offset, filter_parameters)?;
        self.pace().await;
        tracing::trace!(%url, "catalog search");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| QueryError::Fetch(format!("request failed: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| QueryError::Fetch(format!("HTTP error: {}", e.without_url())))?;

        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Fetch(format!("response read failed: {}", e.without_url())))?;

        tracing::trace!(bytes = body.len(), "catalog response received");

        parse_search_response(&body)
    }
}

/// Parse a search response body into a page of `T`.
///
/// Reads the top-level `count` and the entity's collection array
/// (`artists`, `releases`, …).
pub(crate) fn parse_search_response<T: CatalogEntity>(body: &str) -> Result<Page<T>, QueryError> {
    let mut document: Value = serde_json::from_str(body)
        .map_err(|e| QueryError::Fetch(format!("invalid JSON response: {e}")))?;

    let total = document
        .get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| QueryError::Fetch("response has no numeric `count`".into()))?;
    let total_count = usize::try_from(total)
        .map_err(|_| QueryError::Fetch(format!("result count {total} does not fit in memory")))?;

    let key = T::KIND.collection_key();
    let collection = document
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| QueryError::Fetch(format!("response has no `{key}` array")))?;
    let items: Vec<T> = serde_json::from_value(collection)
        .map_err(|e| QueryError::Fetch(format!("malformed `{key}` entry: {e}")))?;

    Ok(Page { items, total_count })
}
