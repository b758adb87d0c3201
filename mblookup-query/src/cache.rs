//! Bounded cache of previously visited result pages.
//!
//! Each result set owns one [`PageCache`], keyed by page offset. Uses
//! [`moka`] for size-bounded eviction with an optional TTL. Entries can
//! disappear at any time; a miss only costs one extra round trip.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::QueryConfig;

/// A page shared between the active window and the cache.
pub type SharedPage<T> = Arc<Vec<T>>;

/// Offset-keyed page cache. A disabled cache stores nothing.
pub struct PageCache<T> {
    inner: Option<Cache<usize, SharedPage<T>>>,
}

impl<T> PageCache<T>
where
    T: Send + Sync + 'static,
{
    /// Build a cache holding at most `capacity` pages.
    ///
    /// A `capacity` of 0 returns a disabled cache. A `ttl` of `None`
    /// keeps pages until they are evicted for space.
    pub fn new(capacity: u64, ttl: Option<Duration>) -> Self {
        if capacity == 0 {
            return Self::disabled();
        }
        let mut builder = Cache::builder().max_capacity(capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: Some(builder.build()),
        }
    }

    /// Build a cache from the `page_cache_*` settings of `config`.
    pub fn from_config(config: &QueryConfig) -> Self {
        let ttl = (config.page_cache_ttl_seconds > 0)
            .then(|| Duration::from_secs(config.page_cache_ttl_seconds));
        Self::new(config.page_cache_capacity, ttl)
    }

    /// A cache that never retains anything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Whether this cache can retain pages at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up the page starting at `offset`.
    pub async fn get(&self, offset: usize) -> Option<SharedPage<T>> {
        match self.inner {
            Some(ref cache) => cache.get(&offset).await,
            None => None,
        }
    }

    /// Store `page` under `offset`, replacing any previous entry.
    pub async fn insert(&self, offset: usize, page: SharedPage<T>) {
        if let Some(ref cache) = self.inner {
            cache.insert(offset, page).await;
        }
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        if let Some(ref cache) = self.inner {
            cache.invalidate_all();
        }
    }
}

impl<T> std::fmt::Debug for PageCache<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("enabled", &self.inner.is_some())
            .field(
                "entries",
                &self.inner.as_ref().map(|cache| cache.entry_count()),
            )
            .finish()
    }
}
