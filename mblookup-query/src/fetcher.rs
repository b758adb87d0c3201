//! Trait definition for the remote page source behind a result set.
//!
//! [`RemoteFetcher`] is the only seam between the paging logic and the
//! network. The bundled [`HttpFetcher`](crate::http::HttpFetcher) talks to
//! the catalog web service; tests plug in in-memory fetchers.

use std::num::NonZeroU8;

use crate::error::QueryError;

/// One page of results plus the total size of the remote result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items starting at the requested offset, at most `limit` of them.
    pub items: Vec<T>,
    /// Number of results matching the query across all pages.
    pub total_count: usize,
}

impl<T> Page<T> {
    /// A page with no items and a total of zero.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// A source of result pages. Every call is exactly one round trip.
///
/// All implementations must be `Send + Sync` so one fetcher can be shared
/// by many result sets.
pub trait RemoteFetcher<T>: Send + Sync {
    /// Fetch up to `limit` results starting at `offset`.
    ///
    /// # Arguments
    ///
    /// * `url_extension`: Endpoint selector, e.g. `artist`.
    /// * `limit`: Page size for this round trip.
    /// * `offset`: Logical index of the first requested result.
    /// * `filter_parameters`: Query constraint, passed through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Fetch`] on transport or parse failure.
    fn fetch(
        &self,
        url_extension: &str,
        limit: NonZeroU8,
        offset: usize,
        filter_parameters: &str,
    ) -> impl std::future::Future<Output = Result<Page<T>, QueryError>> + Send;
}
