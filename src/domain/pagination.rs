//! Pagination state for the post feeds.
//!
//! Two parallel state machines back the two post sources:
//!
//! - [`PostsFeed`] drives the offset-based REST source. At most one fetch is
//!   logically current; issuing a new request bumps a generation counter and
//!   results carrying a stale generation are dropped.
//! - [`GqlPostsFeed`] drives the page-based GraphQL source through a typed
//!   [`PageCache`] keyed by search/sort, with a total-count-aware `has_more`.
//!   Requests are serialized by a single in-flight guard.
//!
//! Both append pages in fetch order and never reorder or deduplicate items.

use std::collections::HashMap;

use crate::domain::models::Post;

/// Fixed page size shared by both sources.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First load after startup.
    Initial,
    /// Pull-to-refresh equivalent: discard and replace.
    Refresh,
    /// Append the next page.
    LoadMore,
}

/// A request against the REST source, tagged with the generation that must
/// still be current when the result comes back.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub start: usize,
    pub limit: usize,
    pub generation: u64,
    pub mode: FetchMode,
}

/// A request against the GraphQL source.
#[derive(Debug, Clone)]
pub struct GqlFetchRequest {
    pub page: u32,
    pub limit: usize,
    pub search: Option<String>,
    pub mode: FetchMode,
}

/// One fetched GraphQL page plus the server-reported total, when present.
#[derive(Debug, Clone)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub total_count: Option<usize>,
}

/// Offset-paginated feed over the REST source.
#[derive(Debug)]
pub struct PostsFeed {
    items: Vec<Post>,
    limit: usize,
    generation: u64,
    in_flight: Option<FetchMode>,
    has_more: bool,
    error: Option<String>,
}

impl PostsFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
            generation: 0,
            in_flight: None,
            has_more: true,
            error: None,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.in_flight, Some(FetchMode::Initial))
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.in_flight, Some(FetchMode::Refresh))
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(self.in_flight, Some(FetchMode::LoadMore))
    }

    /// First load. Supersedes anything in flight.
    pub fn begin_initial(&mut self) -> FetchRequest {
        self.begin_front(FetchMode::Initial)
    }

    /// Reset to the first page. Supersedes anything in flight; on success the
    /// accumulated items are replaced wholesale, not merged.
    pub fn begin_refresh(&mut self) -> FetchRequest {
        self.begin_front(FetchMode::Refresh)
    }

    fn begin_front(&mut self, mode: FetchMode) -> FetchRequest {
        self.generation += 1;
        self.in_flight = Some(mode);
        self.error = None;
        FetchRequest {
            start: 0,
            limit: self.limit,
            generation: self.generation,
            mode,
        }
    }

    /// Request the page after the accumulated items. No-op while any fetch is
    /// in flight or when the source is exhausted.
    pub fn begin_next_page(&mut self) -> Option<FetchRequest> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(FetchMode::LoadMore);
        self.error = None;
        Some(FetchRequest {
            start: self.items.len(),
            limit: self.limit,
            generation: self.generation,
            mode: FetchMode::LoadMore,
        })
    }

    /// Apply a fetch outcome. Outcomes from superseded requests (stale
    /// generation) are dropped without touching state.
    pub fn apply(&mut self, generation: u64, mode: FetchMode, result: Result<Vec<Post>, String>) {
        if generation != self.generation {
            return;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                self.has_more = page.len() == self.limit;
                match mode {
                    FetchMode::Initial | FetchMode::Refresh => self.items = page,
                    FetchMode::LoadMore => self.items.extend(page),
                }
                self.error = None;
            }
            Err(message) => {
                // Items fetched so far are retained; the consumer retries
                // manually via refresh.
                self.error = Some(message);
            }
        }
    }

    /// Insert a locally created post at the top of the accumulation.
    pub fn prepend(&mut self, post: Post) {
        self.items.insert(0, post);
    }

    /// Replace a post in place after a successful update.
    pub fn replace(&mut self, post: Post) {
        if let Some(existing) = self.items.iter_mut().find(|p| p.id == post.id) {
            *existing = post;
        }
    }
}

/// Cache identity for a GraphQL posts query. Page and limit are deliberately
/// excluded so consecutive pages accumulate under one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl QueryKey {
    pub fn for_search(search: Option<String>) -> Self {
        Self { search, sort: None }
    }
}

/// Ordered pages fetched under one [`QueryKey`].
#[derive(Debug, Default)]
pub struct CacheEntry {
    pages: Vec<Vec<Post>>,
    total_count: Option<usize>,
}

impl CacheEntry {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.pages.iter().flatten()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// More pages exist while the accumulation is below the server-reported
    /// total; without a total, a full last page implies more.
    pub fn has_more(&self, limit: usize) -> bool {
        match self.total_count {
            Some(total) => self.item_count() < total,
            None => self.pages.last().map_or(true, |page| page.len() == limit),
        }
    }

    fn push(&mut self, page: PostsPage) {
        if page.total_count.is_some() {
            self.total_count = page.total_count;
        }
        self.pages.push(page.posts);
    }
}

/// Typed pagination cache: a mapping from query key to its ordered pages.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl PageCache {
    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    fn push(&mut self, key: &QueryKey, page: PostsPage) {
        self.entries.entry(key.clone()).or_default().push(page);
    }

    fn reset(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }
}

/// Page-paginated feed over the GraphQL source.
///
/// Unlike the REST feed there is no cancellation: overlapping triggers are
/// prevented up front by refusing to issue a request while one is in flight.
#[derive(Debug)]
pub struct GqlPostsFeed {
    cache: PageCache,
    key: QueryKey,
    page: u32,
    limit: usize,
    in_flight: Option<FetchMode>,
    error: Option<String>,
}

impl GqlPostsFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            cache: PageCache::default(),
            key: QueryKey::default(),
            page: 0,
            limit,
            in_flight: None,
            error: None,
        }
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.cache.get(&self.key).into_iter().flat_map(CacheEntry::posts)
    }

    pub fn item_count(&self) -> usize {
        self.cache.get(&self.key).map_or(0, CacheEntry::item_count)
    }

    pub fn total_count(&self) -> Option<usize> {
        self.cache.get(&self.key).and_then(CacheEntry::total_count)
    }

    pub fn has_more(&self) -> bool {
        self.cache
            .get(&self.key)
            .map_or(true, |entry| entry.has_more(self.limit))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(
            self.in_flight,
            Some(FetchMode::Initial) | Some(FetchMode::Refresh)
        )
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(self.in_flight, Some(FetchMode::LoadMore))
    }

    pub fn begin_initial(&mut self) -> GqlFetchRequest {
        self.in_flight = Some(FetchMode::Initial);
        self.error = None;
        self.front_request(FetchMode::Initial)
    }

    /// Reset to page 1. Refused while another request is in flight.
    pub fn begin_refresh(&mut self) -> Option<GqlFetchRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(FetchMode::Refresh);
        self.error = None;
        Some(self.front_request(FetchMode::Refresh))
    }

    /// Request the next page. Refused while a request is in flight or when
    /// the accumulation has reached the server-reported total.
    pub fn begin_next_page(&mut self) -> Option<GqlFetchRequest> {
        if self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        self.in_flight = Some(FetchMode::LoadMore);
        self.error = None;
        Some(GqlFetchRequest {
            page: self.page + 1,
            limit: self.limit,
            search: self.key.search.clone(),
            mode: FetchMode::LoadMore,
        })
    }

    /// Switch the active query key. Cached pages for the new key are shown
    /// as-is; a fresh key issues an initial fetch. Refused mid-flight.
    pub fn set_search(&mut self, search: Option<String>) -> Option<GqlFetchRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let search = search.filter(|s| !s.trim().is_empty());
        let key = QueryKey::for_search(search);
        if key == self.key {
            return None;
        }
        self.key = key;
        self.error = None;
        match self.cache.get(&self.key) {
            Some(entry) if entry.page_count() > 0 => {
                self.page = entry.page_count() as u32;
                None
            }
            _ => {
                self.page = 0;
                Some(self.begin_initial())
            }
        }
    }

    fn front_request(&self, mode: FetchMode) -> GqlFetchRequest {
        GqlFetchRequest {
            page: 1,
            limit: self.limit,
            search: self.key.search.clone(),
            mode,
        }
    }

    pub fn apply(&mut self, mode: FetchMode, result: Result<PostsPage, String>) {
        if self.in_flight.is_none() {
            return;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                match mode {
                    FetchMode::Initial | FetchMode::Refresh => {
                        self.cache.reset(&self.key);
                        self.page = 1;
                    }
                    FetchMode::LoadMore => self.page += 1,
                }
                self.cache.push(&self.key, page);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64) -> Post {
        Post {
            id,
            title: format!("title {id}"),
            body: format!("body {id}"),
            user_id: 1,
        }
    }

    fn page(range: std::ops::Range<i64>) -> Vec<Post> {
        range.map(post).collect()
    }

    #[test]
    fn rest_pages_accumulate_in_fetch_order() {
        let mut feed = PostsFeed::new(10);

        let req = feed.begin_initial();
        assert_eq!(req.start, 0);
        feed.apply(req.generation, req.mode, Ok(page(0..10)));

        let req = feed.begin_next_page().expect("second page");
        assert_eq!(req.start, 10);
        feed.apply(req.generation, req.mode, Ok(page(10..20)));

        let ids: Vec<i64> = feed.posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
        assert!(feed.has_more());
    }

    #[test]
    fn rest_short_page_flips_has_more() {
        let mut feed = PostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.generation, req.mode, Ok(page(0..10)));

        let req = feed.begin_next_page().unwrap();
        feed.apply(req.generation, req.mode, Ok(page(10..14)));

        assert_eq!(feed.posts().len(), 14);
        assert!(!feed.has_more());
        assert!(feed.begin_next_page().is_none());
    }

    #[test]
    fn rest_refresh_replaces_accumulation() {
        let mut feed = PostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.generation, req.mode, Ok(page(0..10)));
        let req = feed.begin_next_page().unwrap();
        feed.apply(req.generation, req.mode, Ok(page(10..20)));

        let req = feed.begin_refresh();
        assert_eq!(req.start, 0);
        assert!(feed.is_refreshing());
        feed.apply(req.generation, req.mode, Ok(page(100..110)));

        let ids: Vec<i64> = feed.posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, (100..110).collect::<Vec<_>>());
        assert!(feed.has_more());
    }

    #[test]
    fn rest_next_page_is_noop_while_in_flight() {
        let mut feed = PostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.generation, req.mode, Ok(page(0..10)));

        let first = feed.begin_next_page();
        assert!(first.is_some());
        assert!(feed.begin_next_page().is_none());

        let req = feed.begin_refresh();
        assert!(feed.begin_next_page().is_none());
        feed.apply(req.generation, req.mode, Ok(page(0..10)));
        assert!(feed.begin_next_page().is_some());
    }

    #[test]
    fn rest_superseded_result_is_dropped() {
        let mut feed = PostsFeed::new(10);
        let initial = feed.begin_initial();
        feed.apply(initial.generation, initial.mode, Ok(page(0..10)));

        let stale = feed.begin_next_page().unwrap();
        // A refresh supersedes the in-flight load-more.
        let refresh = feed.begin_refresh();

        feed.apply(stale.generation, stale.mode, Ok(page(10..20)));
        assert_eq!(feed.posts().len(), 10, "stale page must not append");
        assert!(feed.is_refreshing());

        feed.apply(refresh.generation, refresh.mode, Ok(page(0..10)));
        assert_eq!(feed.posts().len(), 10);
        assert!(!feed.is_refreshing());
    }

    #[test]
    fn rest_failure_retains_items_and_reports() {
        let mut feed = PostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.generation, req.mode, Ok(page(0..10)));

        let req = feed.begin_next_page().unwrap();
        feed.apply(req.generation, req.mode, Err("HTTP error 500".into()));

        assert_eq!(feed.posts().len(), 10);
        assert_eq!(feed.error(), Some("HTTP error 500"));

        let req = feed.begin_refresh();
        assert!(feed.error().is_none());
        feed.apply(req.generation, req.mode, Ok(page(0..10)));
    }

    #[test]
    fn rest_prepend_and_replace() {
        let mut feed = PostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.generation, req.mode, Ok(page(0..3)));

        feed.prepend(post(101));
        assert_eq!(feed.posts()[0].id, 101);

        let mut updated = post(1);
        updated.title = "edited".into();
        feed.replace(updated);
        assert_eq!(
            feed.posts().iter().find(|p| p.id == 1).unwrap().title,
            "edited"
        );
    }

    fn gql_page(range: std::ops::Range<i64>, total: Option<usize>) -> PostsPage {
        PostsPage {
            posts: page(range),
            total_count: total,
        }
    }

    #[test]
    fn gql_has_more_follows_total_count() {
        let mut feed = GqlPostsFeed::new(10);
        let req = feed.begin_initial();
        assert_eq!(req.page, 1);
        feed.apply(req.mode, Ok(gql_page(0..10, Some(15))));
        assert!(feed.has_more());

        let req = feed.begin_next_page().expect("below total");
        assert_eq!(req.page, 2);
        feed.apply(req.mode, Ok(gql_page(10..15, Some(15))));

        assert_eq!(feed.item_count(), 15);
        assert!(!feed.has_more());
        assert!(feed.begin_next_page().is_none());
    }

    #[test]
    fn gql_requests_are_serialized() {
        let mut feed = GqlPostsFeed::new(10);
        let req = feed.begin_initial();
        // While the initial request is in flight nothing else may start.
        assert!(feed.begin_next_page().is_none());
        assert!(feed.begin_refresh().is_none());
        feed.apply(req.mode, Ok(gql_page(0..10, Some(100))));
        assert!(feed.begin_next_page().is_some());
    }

    #[test]
    fn gql_refresh_replaces_cache_entry() {
        let mut feed = GqlPostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.mode, Ok(gql_page(0..10, Some(100))));
        let req = feed.begin_next_page().unwrap();
        feed.apply(req.mode, Ok(gql_page(10..20, Some(100))));
        assert_eq!(feed.item_count(), 20);

        let req = feed.begin_refresh().unwrap();
        feed.apply(req.mode, Ok(gql_page(0..10, Some(100))));
        assert_eq!(feed.item_count(), 10);

        let req = feed.begin_next_page().unwrap();
        assert_eq!(req.page, 2, "cursor reset by refresh");
    }

    #[test]
    fn gql_cache_keys_pages_by_search() {
        let mut feed = GqlPostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.mode, Ok(gql_page(0..10, Some(100))));

        let req = feed
            .set_search(Some("rust".into()))
            .expect("fresh key issues a fetch");
        assert_eq!(req.search.as_deref(), Some("rust"));
        feed.apply(req.mode, Ok(gql_page(500..503, Some(3))));
        assert_eq!(feed.item_count(), 3);
        assert!(!feed.has_more());

        // Switching back shows the cached accumulation without a fetch.
        assert!(feed.set_search(None).is_none());
        assert_eq!(feed.item_count(), 10);
        let req = feed.begin_next_page().expect("cursor restored from cache");
        assert_eq!(req.page, 2);
    }

    #[test]
    fn gql_error_retains_items() {
        let mut feed = GqlPostsFeed::new(10);
        let req = feed.begin_initial();
        feed.apply(req.mode, Ok(gql_page(0..10, Some(100))));

        let req = feed.begin_next_page().unwrap();
        feed.apply(req.mode, Err("GraphQL error: boom".into()));

        assert_eq!(feed.item_count(), 10);
        assert_eq!(feed.error(), Some("GraphQL error: boom"));
        // The guard is released so a retry can start.
        assert!(feed.begin_next_page().is_some());
    }

    #[test]
    fn cache_entry_falls_back_to_short_page_without_total() {
        let mut entry = CacheEntry::default();
        entry.push(gql_page(0..10, None));
        assert!(entry.has_more(10));
        entry.push(gql_page(10..14, None));
        assert!(!entry.has_more(10));
    }
}
