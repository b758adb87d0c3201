//! # mblookup-query
//!
//! Lazy, windowed, cached pagination over catalog metadata searches.
//!
//! A search against the catalog web service can match thousands of
//! records, but callers usually want "the best match" or "the first few".
//! [`WindowedResultSet`] presents the remote result list as a countable,
//! randomly indexable sequence and turns "give me result N" into at most
//! one round trip per page.
//!
//! ## Design
//!
//! - Pages of `page_size` results are fetched on demand, never eagerly
//! - Pages that scroll out of view go into a bounded per-set cache
//! - The total count is fixed by the first response
//! - [`RemoteFetcher`] is the only network seam; [`HttpFetcher`] is the
//!   bundled implementation for the MusicBrainz JSON API
//! - Query text is logged at trace level only

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod params;
pub mod types;
pub mod window;

pub use cache::PageCache;
pub use client::QueryClient;
pub use config::QueryConfig;
pub use error::{QueryError, Result};
pub use fetcher::{Page, RemoteFetcher};
pub use http::HttpFetcher;
pub use params::QueryParameters;
pub use types::{
    Artist, ArtistCredit, CatalogEntity, EntityKind, Label, Recording, Release, ResultItem,
    PERFECT_SCORE,
};
pub use window::WindowedResultSet;

/// Look up the unambiguous perfect match for `params`, if there is one.
///
/// Convenience wrapper that builds a [`QueryClient`] for `config` and
/// calls [`WindowedResultSet::perfect_match`]: one round trip.
///
/// # Errors
///
/// Returns [`QueryError::Config`] for an invalid configuration or empty
/// parameters, and [`QueryError::Fetch`] if the request fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> mblookup_query::Result<()> {
/// use mblookup_query::{Artist, QueryConfig, QueryParameters};
///
/// let params = QueryParameters::new().field("artist", "Portishead");
/// if let Some(artist) = mblookup_query::perfect_match::<Artist>(&params, &QueryConfig::default()).await? {
///     println!("{} ({})", artist.name, artist.id);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn perfect_match<T>(params: &QueryParameters, config: &QueryConfig) -> Result<Option<T>>
where
    T: CatalogEntity + Clone + Send + Sync + 'static,
{
    let client = QueryClient::new(config.clone())?;
    client.query::<T>(params)?.perfect_match().await
}
