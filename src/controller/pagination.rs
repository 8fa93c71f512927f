//! Paginated collection controller for infinite-scroll lists.
//!
//! A [`Paginator`] owns an ordered, id-deduplicated collection fetched page by
//! page from a [`PageSource`]. At most one page request is in flight per
//! collection: every trigger path (scroll threshold, "load more" button, CLI
//! loop) goes through the same guarded [`Paginator::load_next`].
//!
//! # State transitions
//!
//! - `reset(filter)` clears the items, sets `page = 1` and `has_more = true`,
//!   and bumps a generation counter so a response still in flight for the old
//!   filter is discarded when it lands.
//! - The first `load_next` after a reset fetches page 1 (the seed); later calls
//!   fetch `page + 1`. `page` only advances on a successful non-seed fetch.
//! - A failed fetch keeps the items and stops further loading
//!   (`has_more = false`).
use crate::controller::debounce::Debouncer;
use crate::controller::retry::{with_retry_if, Retryable};
use crate::model::{ListItem, Page};
use crate::store::Store;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Remote list endpoint consumed by a [`Paginator`].
pub trait PageSource: Send + Sync + 'static {
    type Item: ListItem;
    /// Search/category parameters; changing them means a `reset`.
    type Filter: Clone + Default + fmt::Debug + Send + Sync + 'static;
    type Error: std::error::Error + Retryable + Send + Sync + 'static;

    /// Fetch one page (1-based) of at most `page_size` items.
    fn fetch_page(
        &self,
        filter: &Self::Filter,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Self::Item>, Self::Error>> + Send;
}

/// What a call to [`Paginator::load_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A request was already in flight or the list is exhausted.
    Skipped,
    /// A page was applied.
    Loaded { added: usize, has_more: bool },
    /// The collection was reset while the request was in flight; the
    /// response was dropped.
    Stale,
}

/// Footer state for the list UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    /// "No more items".
    Exhausted,
    /// "Could not load"; further automatic loading is stopped.
    Failed(String),
}

/// A page request claimed from the state; carries what the response must be
/// matched against.
#[derive(Debug, Clone)]
pub(crate) struct PageRequest<F> {
    pub filter: F,
    pub page: u32,
    pub generation: u64,
    pub seed: bool,
    /// Identifies this claim among all claims on the collection.
    pub claim: u64,
}

// ============================================================================
// PageState
// ============================================================================

/// Synchronous core of the controller. All mutations happen under the
/// paginator's lock and never span an await.
#[derive(Debug)]
pub(crate) struct PageState<T, F> {
    items: Vec<T>,
    seen: HashSet<String>,
    page: u32,
    has_more: bool,
    loading_more: bool,
    seeded: bool,
    filter: F,
    generation: u64,
    /// Id of the most recent claim; never reset.
    claim: u64,
    last_error: Option<String>,
}

impl<T: ListItem, F: Clone> PageState<T, F> {
    pub fn new(filter: F) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            page: 1,
            has_more: true,
            loading_more: false,
            seeded: false,
            filter,
            generation: 0,
            claim: 0,
            last_error: None,
        }
    }

    pub fn reset(&mut self, filter: F) {
        self.items.clear();
        self.seen.clear();
        self.page = 1;
        self.has_more = true;
        self.loading_more = false;
        self.seeded = false;
        self.filter = filter;
        self.generation = self.generation.wrapping_add(1);
        self.last_error = None;
    }

    /// Claim the next page request, or `None` if one is in flight or the list
    /// is exhausted.
    pub fn begin(&mut self) -> Option<PageRequest<F>> {
        if self.loading_more || !self.has_more {
            return None;
        }
        self.loading_more = true;
        self.claim = self.claim.wrapping_add(1);
        let seed = !self.seeded;
        Some(PageRequest {
            filter: self.filter.clone(),
            page: if seed { 1 } else { self.page.saturating_add(1) },
            generation: self.generation,
            seed,
            claim: self.claim,
        })
    }

    /// Give up a claim whose response will never be applied. Returns false
    /// if the claim was already applied, reset away or superseded.
    pub fn release(&mut self, claim: u64) -> bool {
        if self.loading_more && self.claim == claim {
            self.loading_more = false;
            true
        } else {
            false
        }
    }

    /// Apply a successful response. Returns `Stale` if the collection was
    /// reset since the request was claimed.
    pub fn apply_page(
        &mut self,
        request: &PageRequest<F>,
        page: Page<T>,
        page_size: u32,
    ) -> LoadOutcome {
        if request.generation != self.generation {
            return LoadOutcome::Stale;
        }

        let returned = page.items.len();
        let added = self.append_unseen(page.items);

        if request.seed {
            self.seeded = true;
        } else {
            self.page = request.page;
        }
        self.has_more = match page.pagination {
            Some(meta) => meta.has_next,
            None => returned >= page_size as usize,
        };
        self.loading_more = false;
        self.last_error = None;

        LoadOutcome::Loaded {
            added,
            has_more: self.has_more,
        }
    }

    /// Record a failed fetch. Returns false if the failure belongs to a
    /// previous generation and was ignored.
    pub fn apply_failure(&mut self, request: &PageRequest<F>, message: String) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.has_more = false;
        self.loading_more = false;
        self.last_error = Some(message);
        true
    }

    /// Install server-rendered first-page items without a fetch.
    pub fn seed(&mut self, page: Page<T>, page_size: u32) {
        self.reset(self.filter.clone());
        let returned = page.items.len();
        self.append_unseen(page.items);
        self.seeded = true;
        self.has_more = match page.pagination {
            Some(meta) => meta.has_next,
            None => returned >= page_size as usize,
        };
    }

    fn append_unseen(&mut self, items: Vec<T>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.seen.insert(item.id().to_owned()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    pub fn status(&self) -> ListStatus {
        if self.loading_more {
            ListStatus::Loading
        } else if let Some(err) = &self.last_error {
            ListStatus::Failed(err.clone())
        } else if !self.has_more {
            ListStatus::Exhausted
        } else {
            ListStatus::Idle
        }
    }
}

/// Releases the in-flight claim when `load_next` is dropped mid-fetch.
struct ClaimGuard<'a, T: ListItem, F: Clone> {
    state: &'a Mutex<PageState<T, F>>,
    claim: u64,
}

impl<T: ListItem, F: Clone> Drop for ClaimGuard<'_, T, F> {
    fn drop(&mut self) {
        if self.state.lock().release(self.claim) {
            tracing::debug!(claim = self.claim, "Page load cancelled, released in-flight claim");
        }
    }
}

// ============================================================================
// Paginator
// ============================================================================

/// Handle to a paged collection. Clones share the same collection.
pub struct Paginator<S: PageSource> {
    source: Arc<S>,
    state: Arc<Mutex<PageState<S::Item, S::Filter>>>,
    page_size: u32,
    retry_attempts: u32,
    store: Option<Store>,
}

impl<S: PageSource> Clone for Paginator<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            state: self.state.clone(),
            page_size: self.page_size,
            retry_attempts: self.retry_attempts,
            store: self.store.clone(),
        }
    }
}

impl<S: PageSource> Paginator<S> {
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(PageState::new(S::Filter::default()))),
            page_size: page_size.max(1),
            retry_attempts: Self::DEFAULT_RETRY_ATTEMPTS,
            store: None,
        }
    }

    /// Total attempts per page fetch (transient errors only).
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Report in-flight page loads to the global loading indicator.
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Clear the collection for a new filter. Any in-flight response for the
    /// previous filter will be discarded.
    pub fn reset(&self, filter: S::Filter) {
        tracing::debug!(filter = ?filter, "Resetting paged collection");
        self.state.lock().reset(filter);
    }

    /// Install a server-rendered first page.
    pub fn seed(&self, page: Page<S::Item>) {
        self.state.lock().seed(page, self.page_size);
    }

    /// Fetch and append the next page, unless a fetch is already in flight or
    /// the list is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the source error after retries are exhausted. The collection
    /// keeps its items and stops further loading.
    pub async fn load_next(&self) -> Result<LoadOutcome, S::Error> {
        let claimed = self.state.lock().begin();
        let Some(request) = claimed else {
            tracing::trace!("load_next skipped: in flight or exhausted");
            return Ok(LoadOutcome::Skipped);
        };
        let _claim = ClaimGuard {
            state: &*self.state,
            claim: request.claim,
        };

        tracing::debug!(
            page = request.page,
            seed = request.seed,
            filter = ?request.filter,
            "Fetching page"
        );
        let _loading = self.store.as_ref().map(Store::track_loading);

        let source = &*self.source;
        let page_size = self.page_size;
        let result = with_retry_if(
            self.retry_attempts,
            || source.fetch_page(&request.filter, request.page, page_size),
            |e: &S::Error| e.is_retryable(),
        )
        .await;

        match result {
            Ok(page) => {
                let outcome = self.state.lock().apply_page(&request, page, page_size);
                match outcome {
                    LoadOutcome::Stale => {
                        tracing::debug!(page = request.page, "Discarding page for a reset collection")
                    }
                    LoadOutcome::Loaded { added, has_more } => {
                        tracing::debug!(page = request.page, added, has_more, "Page applied")
                    }
                    LoadOutcome::Skipped => {}
                }
                Ok(outcome)
            }
            Err(e) => {
                let applied = self.state.lock().apply_failure(&request, e.to_string());
                if !applied {
                    tracing::debug!(page = request.page, error = %e, "Ignoring failure for a reset collection");
                    return Ok(LoadOutcome::Stale);
                }
                tracing::warn!(page = request.page, error = %e, "Page fetch failed, stopping pagination");
                Err(e)
            }
        }
    }

    /// Snapshot of the current items.
    pub fn items(&self) -> Vec<S::Item> {
        self.state.lock().items.clone()
    }

    /// Run `f` over the items without cloning them.
    pub fn with_items<R>(&self, f: impl FnOnce(&[S::Item]) -> R) -> R {
        f(&self.state.lock().items)
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.state.lock().page
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn is_loading_more(&self) -> bool {
        self.state.lock().loading_more
    }

    pub fn filter(&self) -> S::Filter {
        self.state.lock().filter.clone()
    }

    pub fn status(&self) -> ListStatus {
        self.state.lock().status()
    }

    /// Debounced scroll handler: once scrolling settles within `threshold`
    /// of the bottom, a guarded `load_next` is spawned.
    pub fn scroll_loader(&self, delay: Duration, threshold: u32) -> Debouncer<ScrollPosition> {
        let paginator = self.clone();
        Debouncer::new(delay, move |pos: ScrollPosition| {
            if !pos.near_bottom(threshold) {
                return;
            }
            let paginator = paginator.clone();
            tokio::spawn(async move {
                if let Err(e) = paginator.load_next().await {
                    tracing::warn!(error = %e, "Scroll-triggered page load failed");
                }
            });
        })
    }
}

// ============================================================================
// Scroll threshold
// ============================================================================

/// Vertical scroll geometry, in any consistent unit (pixels, rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub offset: u32,
    pub viewport: u32,
    pub content: u32,
}

impl ScrollPosition {
    /// True when the bottom of the viewport is within `threshold` of the end
    /// of the content.
    pub fn near_bottom(&self, threshold: u32) -> bool {
        self.offset.saturating_add(self.viewport) >= self.content.saturating_sub(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thiserror::Error;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl ListItem for Item {
        fn id(&self) -> &str {
            &self.0
        }
        fn created_at(&self) -> DateTime<Utc> {
            DateTime::<Utc>::default()
        }
    }

    #[derive(Debug, Error)]
    #[error("mock failure (retryable: {0})")]
    struct MockError(bool);

    impl Retryable for MockError {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Page<Item>, MockError>>>,
        requested: Mutex<Vec<(String, u32)>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Page<Item>, MockError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn gated(responses: Vec<Result<Page<Item>, MockError>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(responses)
            }
        }
    }

    impl PageSource for ScriptedSource {
        type Item = Item;
        type Filter = String;
        type Error = MockError;

        async fn fetch_page(
            &self,
            filter: &String,
            page: u32,
            _page_size: u32,
        ) -> Result<Page<Item>, MockError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push((filter.clone(), page));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Page::new(Vec::new())))
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter().map(|id| Item(id.to_string())).collect()
    }

    fn ids(paginator: &Paginator<ScriptedSource>) -> Vec<String> {
        paginator.with_items(|items| items.iter().map(|i| i.0.clone()).collect())
    }

    #[tokio::test]
    async fn test_overlapping_pages_are_deduplicated() {
        let source = ScriptedSource::new(vec![
            Ok(Page::with_has_next(items(&["1", "2", "3", "4", "5", "6"]), true)),
            Ok(Page::with_has_next(items(&["4", "5", "6", "7", "8", "9"]), true)),
        ]);
        let paginator = Paginator::new(source, 6);

        paginator.load_next().await.unwrap();
        assert_eq!(paginator.page(), 1);

        let outcome = paginator.load_next().await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                added: 3,
                has_more: true
            }
        );
        assert_eq!(paginator.len(), 9);
        assert_eq!(paginator.page(), 2);
        assert_eq!(ids(&paginator), vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        let pages: Vec<u32> = paginator.source().requested.lock().iter().map(|r| r.1).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_duplicates_within_one_page_are_dropped() {
        let source = ScriptedSource::new(vec![Ok(Page::new(items(&["a", "b", "a"])))]);
        let paginator = Paginator::new(source, 10);

        paginator.load_next().await.unwrap();
        assert_eq!(ids(&paginator), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_has_more_falls_back_to_page_size() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(items(&["1", "2", "3"]))),
            Ok(Page::new(items(&["4", "5"]))),
        ]);
        let paginator = Paginator::new(source, 3);

        paginator.load_next().await.unwrap();
        assert!(paginator.has_more());

        paginator.load_next().await.unwrap();
        assert!(!paginator.has_more());
        assert_eq!(paginator.status(), ListStatus::Exhausted);

        assert_eq!(paginator.load_next().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_items_and_page() {
        let source = ScriptedSource::new(vec![
            Ok(Page::with_has_next(items(&["1", "2"]), true)),
            Ok(Page::with_has_next(items(&["3", "4"]), true)),
            Err(MockError(false)),
        ]);
        let paginator = Paginator::new(source, 2);

        paginator.load_next().await.unwrap();
        paginator.load_next().await.unwrap();
        assert_eq!(paginator.page(), 2);

        let err = paginator.load_next().await.unwrap_err();
        assert!(!err.0);
        assert_eq!(paginator.page(), 2);
        assert_eq!(paginator.len(), 4);
        assert!(!paginator.has_more());
        assert!(!paginator.is_loading_more());
        assert!(matches!(paginator.status(), ListStatus::Failed(_)));

        // Stopped: no further fetches
        assert_eq!(paginator.load_next().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let source = ScriptedSource::new(vec![
            Err(MockError(true)),
            Err(MockError(true)),
            Ok(Page::new(items(&["1"]))),
        ]);
        let paginator = Paginator::new(source, 5).with_retry_attempts(3);

        let outcome = paginator.load_next().await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                added: 1,
                has_more: false
            }
        );
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_second_load_while_in_flight_is_noop() {
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::gated(vec![Ok(Page::new(items(&["1"])))], gate.clone());
        let paginator = Paginator::new(source, 1);

        let background = paginator.clone();
        let task = tokio::spawn(async move { background.load_next().await });
        for _ in 0..10 {
            if paginator.source().calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(paginator.is_loading_more());
        assert_eq!(paginator.status(), ListStatus::Loading);

        assert_eq!(paginator.load_next().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(!paginator.is_loading_more());
        assert_eq!(paginator.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_response() {
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::gated(
            vec![
                Ok(Page::new(items(&["old"]))),
                Ok(Page::new(items(&["new"]))),
            ],
            gate.clone(),
        );
        let paginator = Paginator::new(source, 10);

        let background = paginator.clone();
        let task = tokio::spawn(async move { background.load_next().await });
        for _ in 0..10 {
            if paginator.is_loading_more() {
                break;
            }
            tokio::task::yield_now().await;
        }

        paginator.reset("spor".to_string());
        gate.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), LoadOutcome::Stale);
        assert!(paginator.is_empty());
        assert_eq!(paginator.page(), 1);

        gate.notify_one();
        paginator.load_next().await.unwrap();
        assert_eq!(ids(&paginator), vec!["new"]);
        let last = paginator.source().requested.lock().last().cloned();
        assert_eq!(last, Some(("spor".to_string(), 1)));
    }

    #[tokio::test]
    async fn test_reset_restores_initial_state() {
        let source = ScriptedSource::new(vec![Err(MockError(false))]);
        let paginator = Paginator::new(source, 10);

        assert!(paginator.load_next().await.is_err());
        assert!(!paginator.has_more());

        paginator.reset("ekonomi".to_string());
        assert!(paginator.has_more());
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.status(), ListStatus::Idle);
        assert_eq!(paginator.filter(), "ekonomi");
    }

    #[tokio::test]
    async fn test_seed_then_load_next_fetches_page_two() {
        let source = ScriptedSource::new(vec![Ok(Page::new(items(&["3"])))]);
        let paginator = Paginator::new(source, 2);

        paginator.seed(Page::with_has_next(items(&["1", "2"]), true));
        assert_eq!(paginator.len(), 2);

        paginator.load_next().await.unwrap();
        assert_eq!(paginator.page(), 2);
        assert_eq!(ids(&paginator), vec!["1", "2", "3"]);
        let pages: Vec<u32> = paginator.source().requested.lock().iter().map(|r| r.1).collect();
        assert_eq!(pages, vec![2]);
    }

    #[tokio::test]
    async fn test_loading_indicator_tracks_fetch() {
        let store = Store::new();
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::gated(vec![Ok(Page::new(items(&["1"])))], gate.clone());
        let paginator = Paginator::new(source, 1).with_store(store.clone());

        let background = paginator.clone();
        let task = tokio::spawn(async move { background.load_next().await });
        for _ in 0..10 {
            if store.is_loading() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(store.is_loading());

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_loader_fires_near_bottom_only() {
        let source = ScriptedSource::new(vec![Ok(Page::with_has_next(items(&["1"]), true))]);
        let paginator = Paginator::new(source, 1);
        let loader = paginator.scroll_loader(Duration::from_millis(150), 100);

        loader.call(ScrollPosition {
            offset: 0,
            viewport: 500,
            content: 2000,
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 0);

        for offset in [1300, 1350, 1420] {
            loader.call(ScrollPosition {
                offset,
                viewport: 500,
                content: 2000,
            });
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(paginator.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(paginator.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_releases_claim() {
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::gated(vec![Ok(Page::new(items(&["1"])))], gate.clone());
        let paginator = Paginator::new(source, 10);

        let timed_out = tokio::time::timeout(Duration::from_secs(1), paginator.load_next()).await;
        assert!(timed_out.is_err());
        assert!(!paginator.is_loading_more());
        assert_eq!(paginator.status(), ListStatus::Idle);

        gate.notify_one();
        let outcome = paginator.load_next().await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                added: 1,
                has_more: false
            }
        );
        let pages: Vec<u32> = paginator.source().requested.lock().iter().map(|r| r.1).collect();
        assert_eq!(pages, vec![1, 1]);
    }

    #[test]
    fn test_release_ignores_superseded_claim() {
        let mut state: PageState<Item, String> = PageState::new(String::new());
        let first = state.begin().unwrap();
        state.reset("spor".to_string());
        let second = state.begin().unwrap();

        assert!(!state.release(first.claim));
        assert_eq!(state.status(), ListStatus::Loading);
        assert!(state.release(second.claim));
        assert_eq!(state.status(), ListStatus::Idle);
    }

    #[test]
    fn test_next_page_saturates() {
        let mut state: PageState<Item, String> = PageState::new(String::new());
        state.seeded = true;
        state.page = u32::MAX;
        assert_eq!(state.begin().unwrap().page, u32::MAX);
    }

    #[test]
    fn test_near_bottom_threshold() {
        let pos = ScrollPosition {
            offset: 1400,
            viewport: 500,
            content: 2000,
        };
        assert!(pos.near_bottom(100));
        assert!(!pos.near_bottom(50));

        let short = ScrollPosition {
            offset: 0,
            viewport: 800,
            content: 300,
        };
        assert!(short.near_bottom(0));
    }
}
