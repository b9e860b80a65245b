use std::time::Duration;

use crate::bookmarks::BookmarkStore;
use crate::debounce::{DebounceTicket, Debouncer};
use crate::detail::DetailState;
use crate::listing::{FetchTicket, ListState, Outcome};
use crate::media::{ApiError, MovieDetail, MovieId, MoviePage, MovieSummary, SortKey, TrendingEntry};
use crate::query::{parse_year_input, QueryState, FIRST_PAGE};

/// Side effects requested by a state transition. The UI layer runs them as
/// async tasks and feeds their results back in.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScheduleDebounce {
        ticket: DebounceTicket,
        after: Duration,
    },
    FetchList(FetchTicket),
    /// Fire-and-forget; the result is never fed back.
    ReportSearch {
        term: String,
        movie: MovieSummary,
    },
    FetchDetail(MovieId),
}

/// Owns every piece of browsing state. Each transition mutates state in
/// place and returns the effects it needs.
#[derive(Debug, Default)]
pub struct Browser {
    query: QueryState,
    list: ListState,
    bookmarks: BookmarkStore,
    detail: DetailState,
    trending: Vec<TrendingEntry>,
    popular: Vec<MovieSummary>,
    search_input: String,
    year_input: String,
    show_bookmarked: bool,
    debouncer: Debouncer,
}

impl Browser {
    pub fn new(bookmarks: BookmarkStore) -> Self {
        Self {
            bookmarks,
            ..Default::default()
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    pub fn trending(&self) -> &[TrendingEntry] {
        &self.trending
    }

    pub fn popular(&self) -> &[MovieSummary] {
        &self.popular
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn year_input(&self) -> &str {
        &self.year_input
    }

    pub fn show_bookmarked(&self) -> bool {
        self.show_bookmarked
    }

    /// The initial discover listing.
    pub fn start(&mut self) -> Effect {
        self.fetch_current()
    }

    fn fetch_current(&mut self) -> Effect {
        Effect::FetchList(self.list.begin(self.query.compose()))
    }

    pub fn search_input_changed(&mut self, input: String) -> Effect {
        self.search_input = input;
        Effect::ScheduleDebounce {
            ticket: self.debouncer.schedule(),
            after: self.debouncer.quiet_period(),
        }
    }

    pub fn choose_popular(&mut self, title: String) -> Effect {
        self.search_input_changed(title)
    }

    pub fn clear_search(&mut self) -> Option<Effect> {
        self.search_input.clear();
        self.debouncer.cancel();
        self.query.set_term("").then(|| self.fetch_current())
    }

    /// Applies the typed term once its quiet period has passed without a
    /// newer keystroke.
    pub fn debounce_elapsed(&mut self, ticket: DebounceTicket) -> Option<Effect> {
        if !self.debouncer.fire(ticket) {
            return None;
        }
        let term = self.search_input.clone();
        self.query.set_term(&term).then(|| self.fetch_current())
    }

    pub fn toggle_genre(&mut self, genre_id: u64) -> Effect {
        self.query.toggle_genre(genre_id);
        self.fetch_current()
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Option<Effect> {
        self.query.set_sort(sort).then(|| self.fetch_current())
    }

    pub fn year_input_changed(&mut self, input: String) -> Option<Effect> {
        let year = parse_year_input(&input);
        self.year_input = input;
        self.query.set_year(year).then(|| self.fetch_current())
    }

    pub fn clear_filters(&mut self) -> Option<Effect> {
        self.year_input.clear();
        self.query.clear_filters().then(|| self.fetch_current())
    }

    pub fn can_load_more(&self) -> bool {
        !self.show_bookmarked
            && !self.list.is_loading()
            && (self.list.error().is_some() || self.query.has_more_pages())
    }

    /// Requests the next page. Pages past the known total are refused
    /// without touching the network. After a failed fetch the held list is
    /// empty, so this starts over from the first page instead.
    pub fn load_more(&mut self) -> Option<Effect> {
        if self.show_bookmarked || self.list.is_loading() {
            return None;
        }
        if self.list.error().is_some() {
            tracing::debug!("retrying listing from the first page");
            return Some(self.fetch_current());
        }
        match self.query.next_page() {
            Ok(request) => Some(Effect::FetchList(self.list.begin(request))),
            Err(e) => {
                tracing::debug!("not loading more: {}", e);
                None
            }
        }
    }

    pub fn is_loading_more(&self) -> bool {
        self.list.is_loading_more(self.query.page())
    }

    pub fn list_loaded(
        &mut self,
        ticket: FetchTicket,
        result: Result<MoviePage, ApiError>,
    ) -> Option<Effect> {
        match self.list.apply(&ticket, result) {
            Outcome::Loaded { total_pages, top } => {
                self.query.record_total_pages(total_pages);
                let term = ticket.request.search_term()?;
                let movie = top?;
                Some(Effect::ReportSearch {
                    term: term.to_string(),
                    movie,
                })
            }
            Outcome::Failed(_) => {
                self.query.rewind();
                None
            }
            Outcome::Stale => None,
        }
    }

    pub fn open_detail(&mut self, id: MovieId) -> Effect {
        self.detail.open(id);
        Effect::FetchDetail(id)
    }

    pub fn detail_loaded(&mut self, id: MovieId, result: Result<Box<MovieDetail>, ApiError>) -> bool {
        self.detail.resolve(id, result)
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    pub fn toggle_bookmark(&mut self, id: MovieId) -> bool {
        self.bookmarks.toggle(id)
    }

    pub fn toggle_bookmarked_only(&mut self) {
        self.show_bookmarked = !self.show_bookmarked;
    }

    /// The rows to render: the held list, or its bookmarked subset.
    pub fn visible_movies(&self) -> Vec<&MovieSummary> {
        if self.show_bookmarked {
            self.bookmarks.filter(self.list.movies())
        } else {
            self.list.movies().iter().collect()
        }
    }

    /// The trending row belongs to plain browsing only.
    pub fn shows_trending(&self) -> bool {
        !self.show_bookmarked && !self.query.is_searching() && !self.trending.is_empty()
    }

    pub fn trending_loaded(&mut self, result: Result<Vec<TrendingEntry>, ApiError>) {
        match result {
            Ok(entries) => self.trending = entries,
            Err(e) => tracing::warn!("error fetching trending movies: {}", e),
        }
    }

    pub fn popular_loaded(&mut self, result: Result<Vec<MovieSummary>, ApiError>) {
        match result {
            Ok(movies) => self.popular = movies,
            Err(e) => tracing::warn!("error fetching popular movies: {}", e),
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.query.page() == FIRST_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::debounce;
    use crate::listing::fetch_list;
    use crate::query::ListRequest;
    use crate::tmdb::MetadataProvider;
    use crate::trending::{AnalyticsBackend, TrendingTracker};

    fn movie(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {}", id),
            overview: String::new(),
            poster_path: Some(format!("/{}.jpg", id)),
            original_language: Some(String::from("en")),
            release_date: Some(String::from("2008-07-16")),
            vote_average: 8.5,
            adult: false,
        }
    }

    struct FakeProvider {
        requests: Mutex<Vec<ListRequest>>,
        results: Vec<MovieSummary>,
        total_pages: u32,
        failing_page: Mutex<Option<u32>>,
    }

    impl FakeProvider {
        fn new(ids: &[u64], total_pages: u32) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                results: ids.iter().copied().map(movie).collect(),
                total_pages,
                failing_page: Mutex::new(None),
            })
        }

        /// The next request for `page` fails with a server error.
        fn fail_once_on(&self, page: u32) {
            *self.failing_page.lock().unwrap() = Some(page);
        }

        fn requests(&self) -> Vec<ListRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        async fn fetch_list(&self, request: &ListRequest) -> Result<MoviePage, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut failing = self.failing_page.lock().unwrap();
            if *failing == Some(request.page()) {
                *failing = None;
                return Err(ApiError::Status(503));
            }
            Ok(MoviePage {
                page: request.page(),
                total_pages: self.total_pages,
                results: self.results.clone(),
            })
        }

        async fn fetch_detail(&self, _id: MovieId) -> Result<MovieDetail, ApiError> {
            Err(ApiError::Status(404))
        }

        async fn fetch_popular(&self) -> Result<Vec<MovieSummary>, ApiError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        reports: Mutex<Vec<(String, MovieId, String)>>,
    }

    #[async_trait]
    impl AnalyticsBackend for RecordingBackend {
        async fn top_searches(&self, _limit: usize) -> Result<Vec<TrendingEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<(), ApiError> {
            self.reports
                .lock()
                .unwrap()
                .push((term.to_string(), movie.id, movie.title.clone()));
            Ok(())
        }
    }

    /// Runs effects to completion the way the UI layer would.
    async fn drive(
        browser: &mut Browser,
        provider: &Arc<FakeProvider>,
        tracker: &TrendingTracker,
        effects: Vec<Effect>,
    ) {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::ScheduleDebounce { ticket, after } => {
                    let fired = debounce::wait(ticket, after).await;
                    queue.extend(browser.debounce_elapsed(fired));
                }
                Effect::FetchList(ticket) => {
                    let (ticket, result) = fetch_list(provider.clone(), ticket).await;
                    queue.extend(browser.list_loaded(ticket, result));
                }
                Effect::ReportSearch { term, movie } => {
                    tracker.clone().report(term, movie).await;
                }
                Effect::FetchDetail(id) => {
                    let result = provider.fetch_detail(id).await.map(Box::new);
                    browser.detail_loaded(id, result);
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_issues_one_search_and_one_report() {
        let provider = FakeProvider::new(&[155, 272], 3);
        let backend = Arc::new(RecordingBackend::default());
        let tracker = TrendingTracker::new(backend.clone());
        let mut browser = Browser::default();

        let mut typed = String::new();
        let mut effects = Vec::new();
        for ch in "batman".chars() {
            typed.push(ch);
            effects.push(browser.search_input_changed(typed.clone()));
        }
        drive(&mut browser, &provider, &tracker, effects).await;

        assert_eq!(
            provider.requests(),
            vec![ListRequest::Search {
                term: String::from("batman"),
                page: 1
            }]
        );
        assert_eq!(
            *backend.reports.lock().unwrap(),
            vec![(String::from("batman"), 155, String::from("Movie 155"))]
        );
        assert_eq!(browser.list().movies().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn search_with_no_results_is_not_reported() {
        let provider = FakeProvider::new(&[], 0);
        let backend = Arc::new(RecordingBackend::default());
        let tracker = TrendingTracker::new(backend.clone());
        let mut browser = Browser::default();

        let effect = browser.search_input_changed(String::from("qwzx"));
        drive(&mut browser, &provider, &tracker, vec![effect]).await;

        assert_eq!(provider.requests().len(), 1);
        assert!(backend.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn discover_fetch_is_never_reported() {
        let provider = FakeProvider::new(&[1, 2], 2);
        let backend = Arc::new(RecordingBackend::default());
        let tracker = TrendingTracker::new(backend.clone());
        let mut browser = Browser::default();

        let effect = browser.start();
        drive(&mut browser, &provider, &tracker, vec![effect]).await;

        assert!(matches!(provider.requests()[0], ListRequest::Discover { page: 1, .. }));
        assert!(backend.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bookmarked_only_filters_without_fetching() {
        let provider = FakeProvider::new(&[5, 7, 9], 1);
        let tracker = TrendingTracker::disabled();
        let mut browser = Browser::default();
        browser.toggle_bookmark(5);
        browser.toggle_bookmark(9);

        let effect = browser.start();
        drive(&mut browser, &provider, &tracker, vec![effect]).await;
        let fetched = provider.requests().len();

        browser.toggle_bookmarked_only();

        let shown: Vec<u64> = browser.visible_movies().iter().map(|m| m.id).collect();
        assert_eq!(shown, vec![5, 9]);
        assert_eq!(provider.requests().len(), fetched);
        assert!(!browser.can_load_more());
    }

    #[tokio::test]
    async fn load_more_past_last_page_is_refused_locally() {
        let provider = FakeProvider::new(&[1, 2], 2);
        let tracker = TrendingTracker::disabled();
        let mut browser = Browser::default();

        let effect = browser.start();
        drive(&mut browser, &provider, &tracker, vec![effect]).await;

        let more = browser.load_more();
        assert!(more.is_some());
        drive(&mut browser, &provider, &tracker, more.into_iter().collect()).await;
        assert_eq!(browser.list().movies().len(), 4);
        assert!(!browser.can_load_more());

        assert_eq!(browser.load_more(), None);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn failed_load_more_retries_from_first_page() {
        let provider = FakeProvider::new(&[1, 2], 4);
        let tracker = TrendingTracker::disabled();
        let mut browser = Browser::default();

        let effect = browser.start();
        drive(&mut browser, &provider, &tracker, vec![effect]).await;

        provider.fail_once_on(2);
        let more = browser.load_more();
        drive(&mut browser, &provider, &tracker, more.into_iter().collect()).await;
        assert!(browser.list().error().is_some());
        assert!(browser.list().movies().is_empty());
        assert!(browser.is_first_page());
        assert!(browser.can_load_more());

        let retry = browser.load_more();
        assert!(matches!(retry, Some(Effect::FetchList(ref t)) if t.request.page() == 1));
        drive(&mut browser, &provider, &tracker, retry.into_iter().collect()).await;
        assert_eq!(browser.list().error(), None);
        assert_eq!(browser.list().movies().len(), 2);

        let more = browser.load_more();
        assert!(matches!(more, Some(Effect::FetchList(ref t)) if t.request.page() == 2));
        drive(&mut browser, &provider, &tracker, more.into_iter().collect()).await;
        assert_eq!(browser.list().movies().len(), 4);

        let pages: Vec<u32> = provider.requests().iter().map(|r| r.page()).collect();
        assert_eq!(pages, vec![1, 2, 1, 2]);
    }

    #[test]
    fn filter_change_resets_page_before_fetch() {
        let mut browser = Browser::default();
        let ticket = match browser.start() {
            Effect::FetchList(ticket) => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        browser.list_loaded(
            ticket,
            Ok(MoviePage {
                page: 1,
                total_pages: 4,
                results: vec![movie(1)],
            }),
        );
        let next = browser.load_more();
        assert!(matches!(next, Some(Effect::FetchList(ref t)) if t.request.page() == 2));

        match browser.toggle_genre(28) {
            Effect::FetchList(ticket) => assert_eq!(ticket.request.page(), 1),
            other => panic!("unexpected effect {:?}", other),
        }
        assert!(browser.is_first_page());
    }

    #[test]
    fn clearing_search_returns_to_discover() {
        let mut browser = Browser::default();
        let ticket = match browser.search_input_changed(String::from("alien")) {
            Effect::ScheduleDebounce { ticket, .. } => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        assert!(browser.debounce_elapsed(ticket).is_some());

        match browser.clear_search() {
            Some(Effect::FetchList(ticket)) => {
                assert!(matches!(ticket.request, ListRequest::Discover { .. }))
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(browser.search_input(), "");
    }

    #[test]
    fn unchanged_term_does_not_refetch() {
        let mut browser = Browser::default();
        let first = match browser.search_input_changed(String::from("dune")) {
            Effect::ScheduleDebounce { ticket, .. } => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        assert!(browser.debounce_elapsed(first).is_some());

        let again = match browser.search_input_changed(String::from("dune ")) {
            Effect::ScheduleDebounce { ticket, .. } => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        assert_eq!(browser.debounce_elapsed(again), None);
    }

    #[test]
    fn invalid_year_clears_filter() {
        let mut browser = Browser::default();
        assert!(browser.year_input_changed(String::from("1999")).is_some());
        assert_eq!(browser.query().year(), Some(1999));

        assert!(browser.year_input_changed(String::from("19")).is_some());
        assert_eq!(browser.query().year(), None);
        assert_eq!(browser.year_input(), "19");

        assert_eq!(browser.year_input_changed(String::from("abc")), None);
    }

    #[tokio::test]
    async fn detail_failure_shows_error_panel() {
        let provider = FakeProvider::new(&[], 0);
        let tracker = TrendingTracker::disabled();
        let mut browser = Browser::default();

        let effect = browser.open_detail(42);
        drive(&mut browser, &provider, &tracker, vec![effect]).await;

        assert!(matches!(browser.detail(), DetailState::Failed { id: 42, .. }));
        browser.close_detail();
        assert!(!browser.detail().is_open());
    }

    #[test]
    fn trending_row_hidden_while_searching_or_bookmarked_only() {
        let mut browser = Browser::default();
        browser.trending_loaded(Ok(vec![TrendingEntry {
            document_id: String::from("doc1"),
            search_term: String::from("batman"),
            count: 3,
            movie_id: 268,
            title: String::from("Batman"),
            poster_url: None,
        }]));
        assert!(browser.shows_trending());

        browser.toggle_bookmarked_only();
        assert!(!browser.shows_trending());
        browser.toggle_bookmarked_only();

        let ticket = match browser.search_input_changed(String::from("alien")) {
            Effect::ScheduleDebounce { ticket, .. } => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        browser.debounce_elapsed(ticket);
        assert!(!browser.shows_trending());

        browser.clear_search();
        assert!(browser.shows_trending());
    }

    #[test]
    fn trending_failure_leaves_row_empty() {
        let mut browser = Browser::default();
        browser.trending_loaded(Err(ApiError::Network(String::from("offline"))));
        assert!(browser.trending().is_empty());
        assert!(!browser.shows_trending());
    }
}
