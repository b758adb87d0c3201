//! Query configuration with defaults suited to the public MusicBrainz service.
//!
//! [`QueryConfig`] controls the endpoint, page size, request pacing and the
//! page cache. It is serde-friendly so applications can embed it in their
//! own config files.

use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::QueryError;

/// Default web service root. Entity endpoints are joined onto it.
pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2/";

/// Configuration for catalog queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Web service root, must end with `/`.
    pub base_url: String,
    /// Number of results fetched per round trip (1–255).
    pub page_size: u8,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent sent with every request. The service rejects anonymous clients.
    pub user_agent: String,
    /// Minimum spacing between two requests from the same fetcher, in milliseconds.
    pub request_interval_ms: u64,
    /// Maximum number of previously visited pages kept per result set.
    /// Set to 0 to disable the page cache.
    pub page_cache_capacity: u64,
    /// How long a cached page stays usable, in seconds. 0 means no expiry.
    pub page_cache_ttl_seconds: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            page_size: 25,
            timeout_seconds: 10,
            user_agent: format!(
                "mblookup/{} ( https://musicbrainz.org/doc/MusicBrainz_API )",
                env!("CARGO_PKG_VERSION")
            ),
            request_interval_ms: 1000,
            page_cache_capacity: 16,
            page_cache_ttl_seconds: 600,
        }
    }
}

impl QueryConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `page_size` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `user_agent` must not be blank
    /// - `base_url` must parse and end with `/`
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page_size == 0 {
            return Err(QueryError::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(QueryError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(QueryError::Config("user_agent must not be empty".into()));
        }
        self.base_url()?;
        Ok(())
    }

    /// The page size as a non-zero value.
    pub fn page_size(&self) -> Result<NonZeroU8, QueryError> {
        NonZeroU8::new(self.page_size)
            .ok_or_else(|| QueryError::Config("page_size must be greater than 0".into()))
    }

    /// The parsed web service root.
    pub fn base_url(&self) -> Result<Url, QueryError> {
        if !self.base_url.ends_with('/') {
            return Err(QueryError::Config("base_url must end with '/'".into()));
        }
        Url::parse(&self.base_url)
            .map_err(|e| QueryError::Config(format!("invalid base_url: {e}")))
    }
}
