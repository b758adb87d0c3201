//! Factory for result sets sharing one fetcher and one configuration.

use std::num::NonZeroU8;
use std::sync::Arc;

use crate::cache::PageCache;
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::fetcher::RemoteFetcher;
use crate::http::HttpFetcher;
use crate::params::QueryParameters;
use crate::types::{Artist, CatalogEntity, Label, Recording, Release};
use crate::window::WindowedResultSet;

/// Creates [`WindowedResultSet`]s for catalog searches.
///
/// All sets built by one client share its fetcher, so HTTP request pacing
/// is enforced across them. Each set gets its own page cache.
#[derive(Debug)]
pub struct QueryClient<F = HttpFetcher> {
    fetcher: Arc<F>,
    config: QueryConfig,
    page_size: NonZeroU8,
}

impl QueryClient<HttpFetcher> {
    /// A client talking to the web service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if `config` is invalid.
    pub fn new(config: QueryConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(Arc::new(fetcher), config)
    }
}

impl<F> QueryClient<F> {
    /// A client using a custom fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if `config` is invalid.
    pub fn with_fetcher(fetcher: Arc<F>, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        let page_size = config.page_size()?;
        Ok(Self {
            fetcher,
            config,
            page_size,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// The shared fetcher.
    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Search for `T` with the configured page size.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if `params` is empty. Nothing is
    /// fetched until the set is first accessed.
    pub fn query<T>(&self, params: &QueryParameters) -> Result<WindowedResultSet<T, F>>
    where
        T: CatalogEntity + Clone + Send + Sync + 'static,
        F: RemoteFetcher<T>,
    {
        self.query_with_page_size(params, self.page_size)
    }

    /// Search for `T` with an explicit page size.
    pub fn query_with_page_size<T>(
        &self,
        params: &QueryParameters,
        page_size: NonZeroU8,
    ) -> Result<WindowedResultSet<T, F>>
    where
        T: CatalogEntity + Clone + Send + Sync + 'static,
        F: RemoteFetcher<T>,
    {
        if params.is_empty() {
            return Err(QueryError::Config(
                "query parameters must not be empty".into(),
            ));
        }
        tracing::debug!(entity = %T::KIND, page_size = page_size.get(), "new result set");
        Ok(WindowedResultSet::new(
            Arc::clone(&self.fetcher),
            T::KIND.url_extension(),
            params.to_filter(),
            page_size,
            PageCache::from_config(&self.config),
        ))
    }

    /// Artists whose name matches `name`.
    pub fn artists(&self, name: &str) -> Result<WindowedResultSet<Artist, F>>
    where
        F: RemoteFetcher<Artist>,
    {
        self.query(&QueryParameters::new().field("artist", name))
    }

    /// Releases whose title matches `title`.
    pub fn releases(&self, title: &str) -> Result<WindowedResultSet<Release, F>>
    where
        F: RemoteFetcher<Release>,
    {
        self.query(&QueryParameters::new().field("release", title))
    }

    /// Recordings whose title matches `title`.
    pub fn recordings(&self, title: &str) -> Result<WindowedResultSet<Recording, F>>
    where
        F: RemoteFetcher<Recording>,
    {
        self.query(&QueryParameters::new().field("recording", title))
    }

    /// Labels whose name matches `name`.
    pub fn labels(&self, name: &str) -> Result<WindowedResultSet<Label, F>>
    where
        F: RemoteFetcher<Label>,
    {
        self.query(&QueryParameters::new().field("label", name))
    }
}
