//! Lazy, randomly indexable view over a paginated remote result list.
//!
//! A [`WindowedResultSet`] holds one page of results (the *window*) and
//! fetches a new page only when an index outside it is requested. Pages
//! that scroll out of the window go into a bounded [`PageCache`] so that
//! revisiting them is usually free. Nothing is fetched until the first
//! access.
//!
//! # Score ordering
//!
//! [`best`](WindowedResultSet::best) and
//! [`to_list`](WindowedResultSet::to_list) stop at the first result below
//! the threshold instead of skipping it. They assume the service returns
//! results in descending score order.

use std::num::NonZeroU8;
use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};

use crate::cache::{PageCache, SharedPage};
use crate::error::{QueryError, Result};
use crate::fetcher::{Page, RemoteFetcher};
use crate::types::{ResultItem, PERFECT_SCORE};

const SINGLE: NonZeroU8 = NonZeroU8::MIN;
const PAIR: NonZeroU8 = NonZeroU8::MIN.saturating_add(1);

/// Windowed, cached pagination over the results of one query.
///
/// Every operation takes `&mut self`: a set has one logical owner and
/// callers sharing it across tasks must serialise access themselves.
/// Each operation issues at most one round trip, except the bulk
/// collectors ([`to_list`](Self::to_list), [`to_array`](Self::to_array))
/// and the streams, which fetch one page per window they cross.
pub struct WindowedResultSet<T, F> {
    fetcher: Arc<F>,
    url_extension: String,
    filter_parameters: String,
    page_size: NonZeroU8,
    offset: usize,
    page: Option<SharedPage<T>>,
    total_count: Option<usize>,
    page_cache: PageCache<T>,
}

impl<T, F> WindowedResultSet<T, F>
where
    T: ResultItem + Clone + Send + Sync + 'static,
    F: RemoteFetcher<T>,
{
    /// Create an empty, unfetched result set.
    pub fn new(
        fetcher: Arc<F>,
        url_extension: impl Into<String>,
        filter_parameters: impl Into<String>,
        page_size: NonZeroU8,
        page_cache: PageCache<T>,
    ) -> Self {
        Self {
            fetcher,
            url_extension: url_extension.into(),
            filter_parameters: filter_parameters.into(),
            page_size,
            offset: 0,
            page: None,
            total_count: None,
            page_cache,
        }
    }

    /// Endpoint selector passed to the fetcher.
    pub fn url_extension(&self) -> &str {
        &self.url_extension
    }

    /// Query constraint passed to the fetcher.
    pub fn filter_parameters(&self) -> &str {
        &self.filter_parameters
    }

    /// Number of results fetched per round trip.
    pub fn page_size(&self) -> NonZeroU8 {
        self.page_size
    }

    /// Logical index of the first result in the current window.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The total result count, if a round trip has happened yet.
    pub fn known_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Total number of results.
    ///
    /// The first call fetches the current window; the value never
    /// changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Fetch`] if that first round trip fails.
    pub async fn count(&mut self) -> Result<usize> {
        if let Some(count) = self.total_count {
            return Ok(count);
        }
        self.window().await?;
        Ok(self.total_count.unwrap_or_default())
    }

    /// The result at logical position `index`.
    ///
    /// Served from the current window when `index` falls inside it;
    /// otherwise the window moves to start at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::IndexOutOfRange`] if `index >= count()`, or
    /// [`QueryError::Fetch`] if the round trip fails.
    pub async fn get(&mut self, index: usize) -> Result<T> {
        // Move first when the count is still unknown so the one fetch
        // lands on the requested window.
        let may_exist = self.total_count.map_or(true, |count| index < count);
        if may_exist && !self.window_contains(index) {
            self.set_offset(index).await;
        }

        let count = self.count().await?;
        if index >= count {
            return Err(QueryError::IndexOutOfRange { index, count });
        }

        let page = self.window().await?;
        page.get(index - self.offset).cloned().ok_or_else(|| {
            QueryError::Fetch(format!(
                "page at offset {} holds {} of {count} results, index {index} missing",
                self.offset,
                page.len()
            ))
        })
    }

    /// The top result, or `None` for an empty set.
    ///
    /// Always one round trip of a single result at offset 0, whatever the
    /// current window. The window itself is left alone.
    pub async fn first(&mut self) -> Result<Option<T>> {
        Ok(self.head(SINGLE).await?.into_iter().next())
    }

    /// The top result, or `T::default()` for an empty set.
    pub async fn first_or_default(&mut self) -> Result<T>
    where
        T: Default,
    {
        Ok(self.first().await?.unwrap_or_default())
    }

    /// The top result if it is an unambiguous perfect match.
    ///
    /// That is: it scores [`PERFECT_SCORE`] and it is either the only
    /// result or the runner-up scores lower. One round trip.
    pub async fn perfect_match(&mut self) -> Result<Option<T>> {
        let mut head = self.head(PAIR).await?.into_iter();
        let (top, runner_up) = (head.next(), head.next());
        Ok(top.filter(|top| {
            top.score() == PERFECT_SCORE
                && runner_up
                    .as_ref()
                    .map_or(true, |next| next.score() < PERFECT_SCORE)
        }))
    }

    /// Results in order while their score is at least `score_threshold`.
    ///
    /// The stream ends at the first result scoring below the threshold,
    /// even if later results would pass it. Every call starts again from
    /// index 0.
    pub fn best(&mut self, score_threshold: u8) -> impl Stream<Item = Result<T>> + '_ {
        try_stream! {
            let count = self.count().await?;
            for index in 0..count {
                let item = self.get(index).await?;
                if item.score() < score_threshold {
                    break;
                }
                yield item;
            }
        }
    }

    /// Every result, in order.
    pub fn items(&mut self) -> impl Stream<Item = Result<T>> + '_ {
        self.best(0)
    }

    /// Collect [`best`](Self::best) into a vector.
    pub async fn to_list(&mut self, score_threshold: u8) -> Result<Vec<T>> {
        let mut list = if score_threshold == 0 {
            Vec::with_capacity(self.capacity_hint().await?)
        } else {
            Vec::new()
        };
        let stream = self.best(score_threshold);
        futures::pin_mut!(stream);
        while let Some(item) = stream.try_next().await? {
            list.push(item);
        }
        Ok(list)
    }

    /// Every result by index, without score filtering.
    pub async fn to_array(&mut self) -> Result<Box<[T]>> {
        let count = self.count().await?;
        let mut items = Vec::with_capacity(self.capacity_hint().await?);
        for index in 0..count {
            items.push(self.get(index).await?);
        }
        Ok(items.into_boxed_slice())
    }

    /// Drop every cached page. The current window is kept.
    pub fn forget_cached_pages(&self) {
        self.page_cache.clear();
    }

    /// Initial capacity for a full collection. The reported total is not
    /// trusted beyond one page.
    async fn capacity_hint(&mut self) -> Result<usize> {
        let count = self.count().await?;
        Ok(count.min(usize::from(self.page_size.get())))
    }

    fn window_contains(&self, index: usize) -> bool {
        index >= self.offset && index - self.offset < usize::from(self.page_size.get())
    }

    /// The current page, fetched if absent.
    async fn window(&mut self) -> Result<SharedPage<T>> {
        if let Some(ref page) = self.page {
            return Ok(Arc::clone(page));
        }
        let page = Arc::new(self.fetch_scoped(self.page_size, self.offset).await?);
        self.page = Some(Arc::clone(&page));
        Ok(page)
    }

    /// Move the window to `offset`, parking the old page in the cache and
    /// adopting a cached page for the new offset if one survives.
    async fn set_offset(&mut self, offset: usize) {
        if offset == self.offset {
            return;
        }
        if let Some(page) = self.page.take() {
            self.page_cache.insert(self.offset, page).await;
        }
        self.offset = offset;
        self.page = self.page_cache.get(offset).await;
        tracing::debug!(
            endpoint = %self.url_extension,
            offset,
            cache_hit = self.page.is_some(),
            "window moved"
        );
    }

    /// Up to `limit` results from offset 0, bypassing the window.
    async fn head(&mut self, limit: NonZeroU8) -> Result<Vec<T>> {
        if self.total_count == Some(0) {
            return Ok(Vec::new());
        }
        self.fetch_scoped(limit, 0).await
    }

    /// One round trip. Records the total on first use.
    async fn fetch_scoped(&mut self, limit: NonZeroU8, offset: usize) -> Result<Vec<T>> {
        tracing::trace!(
            endpoint = %self.url_extension,
            query = %self.filter_parameters,
            limit = limit.get(),
            offset,
            "fetching page"
        );
        let Page { items, total_count } = self
            .fetcher
            .fetch(&self.url_extension, limit, offset, &self.filter_parameters)
            .await
            .inspect_err(|err| {
                tracing::warn!(endpoint = %self.url_extension, offset, error = %err, "page fetch failed");
            })?;
        self.record_total(total_count);
        Ok(items)
    }

    fn record_total(&mut self, reported: usize) {
        match self.total_count {
            Some(known) if known != reported => {
                tracing::debug!(known, reported, "ignoring changed total count");
            }
            Some(_) => {}
            None => self.total_count = Some(reported),
        }
    }
}

impl<T, F> std::fmt::Debug for WindowedResultSet<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedResultSet")
            .field("url_extension", &self.url_extension)
            .field("page_size", &self.page_size)
            .field("offset", &self.offset)
            .field("page_len", &self.page.as_ref().map(|page| page.len()))
            .field("total_count", &self.total_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Hit {
        position: usize,
        score: u8,
    }

    impl ResultItem for Hit {
        fn score(&self) -> u8 {
            self.score
        }
    }

    /// Serves `scores` as hits and counts round trips.
    struct ScoreFetcher {
        scores: Vec<u8>,
        calls: AtomicUsize,
    }

    impl ScoreFetcher {
        fn new(scores: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                scores: scores.to_vec(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RemoteFetcher<Hit> for ScoreFetcher {
        async fn fetch(
            &self,
            _url_extension: &str,
            limit: NonZeroU8,
            offset: usize,
            _filter_parameters: &str,
        ) -> Result<Page<Hit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items = self
                .scores
                .iter()
                .enumerate()
                .skip(offset)
                .take(usize::from(limit.get()))
                .map(|(position, &score)| Hit { position, score })
                .collect();
            Ok(Page {
                items,
                total_count: self.scores.len(),
            })
        }
    }

    fn set(fetcher: &Arc<ScoreFetcher>, page_size: u8) -> WindowedResultSet<Hit, ScoreFetcher> {
        WindowedResultSet::new(
            Arc::clone(fetcher),
            "artist",
            "artist:\"test\"",
            NonZeroU8::new(page_size).expect("non-zero"),
            PageCache::new(8, None),
        )
    }

    #[test]
    fn pair_constant_is_two() {
        assert_eq!(SINGLE.get(), 1);
        assert_eq!(PAIR.get(), 2);
    }

    #[tokio::test]
    async fn nothing_fetched_before_first_access() {
        let fetcher = ScoreFetcher::new(&[100, 90]);
        let results = set(&fetcher, 2);
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(results.known_count(), None);
    }

    #[tokio::test]
    async fn count_fetches_once_and_is_stable() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);

        assert_eq!(results.count().await.expect("count"), 5);
        assert_eq!(fetcher.calls(), 1);

        results.get(4).await.expect("get");
        assert_eq!(results.count().await.expect("count"), 5);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn get_within_window_costs_nothing_extra() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 3);

        assert_eq!(results.get(0).await.expect("get").position, 0);
        assert_eq!(results.get(2).await.expect("get").position, 2);
        assert_eq!(results.get(1).await.expect("get").position, 1);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn get_outside_window_moves_window() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);

        results.get(0).await.expect("get");
        let hit = results.get(3).await.expect("get");
        assert_eq!(hit.position, 3);
        assert_eq!(results.offset(), 3);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn first_access_far_away_is_one_round_trip() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);

        assert_eq!(results.get(4).await.expect("get").position, 4);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn revisit_hits_page_cache() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);

        results.get(0).await.expect("get");
        results.get(3).await.expect("get");
        let calls = fetcher.calls();
        assert_eq!(results.get(0).await.expect("get").position, 0);
        assert_eq!(fetcher.calls(), calls);
    }

    #[tokio::test]
    async fn revisit_after_forgetting_refetches_once() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);

        results.get(0).await.expect("get");
        results.get(3).await.expect("get");
        results.forget_cached_pages();
        let calls = fetcher.calls();
        assert_eq!(results.get(0).await.expect("get").position, 0);
        assert_eq!(fetcher.calls(), calls + 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_refetches() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = WindowedResultSet::new(
            Arc::clone(&fetcher),
            "artist",
            "q",
            NonZeroU8::new(2).expect("non-zero"),
            PageCache::disabled(),
        );

        results.get(0).await.expect("get");
        results.get(3).await.expect("get");
        results.get(0).await.expect("get");
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn out_of_range_index_rejected_without_round_trip() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80]);
        let mut results = set(&fetcher, 2);
        results.count().await.expect("count");
        let calls = fetcher.calls();

        let err = results.get(3).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::IndexOutOfRange { index: 3, count: 3 }
        ));
        assert!(results.get(usize::MAX).await.is_err());
        assert_eq!(fetcher.calls(), calls);
    }

    #[tokio::test]
    async fn out_of_range_on_unfetched_set() {
        let fetcher = ScoreFetcher::new(&[100]);
        let mut results = set(&fetcher, 2);

        let err = results.get(7).await.unwrap_err();
        assert!(matches!(err, QueryError::IndexOutOfRange { index: 7, count: 1 }));
        assert_eq!(results.get(0).await.expect("get").position, 0);
    }

    #[tokio::test]
    async fn first_is_one_round_trip_regardless_of_window() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60]);
        let mut results = set(&fetcher, 2);
        results.get(4).await.expect("get");
        let calls = fetcher.calls();

        let top = results.first().await.expect("first").expect("non-empty");
        assert_eq!(top.score, 100);
        assert_eq!(fetcher.calls(), calls + 1);
        assert_eq!(results.offset(), 4);
    }

    #[tokio::test]
    async fn first_on_empty_set_is_none() {
        let fetcher = ScoreFetcher::new(&[]);
        let mut results = set(&fetcher, 2);

        assert!(results.first().await.expect("first").is_none());
        assert!(results.first().await.expect("first").is_none());
        // Known-empty sets skip the second round trip.
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn first_or_default_falls_back() {
        let fetcher = ScoreFetcher::new(&[]);
        let mut results = set(&fetcher, 2);
        assert_eq!(
            results.first_or_default().await.expect("first"),
            Hit::default()
        );
    }

    #[tokio::test]
    async fn perfect_match_cases() {
        let cases: &[(&[u8], Option<usize>)] = &[
            (&[], None),
            (&[100], Some(0)),
            (&[100, 99], Some(0)),
            (&[100, 100], None),
            (&[99, 80], None),
        ];
        for (scores, expected) in cases {
            let fetcher = ScoreFetcher::new(scores);
            let mut results = set(&fetcher, 5);
            let matched = results.perfect_match().await.expect("perfect match");
            assert_eq!(matched.map(|hit| hit.position), *expected, "scores {scores:?}");
            assert_eq!(fetcher.calls(), 1);
        }
    }

    #[tokio::test]
    async fn best_truncates_at_first_miss() {
        let fetcher = ScoreFetcher::new(&[100, 100, 80, 95]);
        let mut results = set(&fetcher, 2);

        let best: Vec<Hit> = results
            .best(PERFECT_SCORE)
            .map(|item| item.expect("item"))
            .collect()
            .await;
        assert_eq!(
            best.iter().map(|hit| hit.position).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[tokio::test]
    async fn best_restarts_from_zero_each_call() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80]);
        let mut results = set(&fetcher, 1);

        let first_pass = results.to_list(85).await.expect("list");
        let second_pass = results.to_list(85).await.expect("list");
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 2);
    }

    #[tokio::test]
    async fn items_streams_everything_in_order() {
        let fetcher = ScoreFetcher::new(&[5, 90, 0, 70]);
        let mut results = set(&fetcher, 3);

        let positions: Vec<usize> = results
            .items()
            .map(|item| item.expect("item").position)
            .collect()
            .await;
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn to_array_matches_count() {
        let fetcher = ScoreFetcher::new(&[100, 90, 80, 70, 60, 50, 40]);
        let mut results = set(&fetcher, 3);

        let all = results.to_array().await.expect("array");
        assert_eq!(all.len(), results.count().await.expect("count"));
        for (index, hit) in all.iter().enumerate() {
            assert_eq!(hit.position, index);
        }
    }

    /// Claims an enormous total but never serves an item.
    struct InflatedFetcher;

    impl RemoteFetcher<Hit> for InflatedFetcher {
        async fn fetch(
            &self,
            _url_extension: &str,
            _limit: NonZeroU8,
            _offset: usize,
            _filter_parameters: &str,
        ) -> Result<Page<Hit>> {
            Ok(Page {
                items: Vec::new(),
                total_count: usize::MAX / 2,
            })
        }
    }

    fn inflated() -> WindowedResultSet<Hit, InflatedFetcher> {
        WindowedResultSet::new(
            Arc::new(InflatedFetcher),
            "artist",
            "artist:\"test\"",
            PAIR,
            PageCache::new(8, None),
        )
    }

    #[tokio::test]
    async fn collectors_report_short_pages_for_inflated_totals() {
        let mut results = inflated();
        assert!(matches!(results.to_list(0).await, Err(QueryError::Fetch(_))));
        assert!(matches!(results.to_list(1).await, Err(QueryError::Fetch(_))));

        let mut results = inflated();
        assert!(matches!(results.to_array().await, Err(QueryError::Fetch(_))));
    }

    #[tokio::test]
    async fn debug_output_omits_items() {
        let fetcher = ScoreFetcher::new(&[100]);
        let results = set(&fetcher, 2);
        let rendered = format!("{results:?}");
        assert!(rendered.contains("WindowedResultSet"));
        assert!(rendered.contains("artist"));
    }
}
