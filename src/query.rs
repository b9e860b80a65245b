//! Turns the current search/filter/sort selection into exactly one outbound
//! list request.

use chrono::Datelike;

use crate::media::SortKey;

pub const FIRST_PAGE: u32 = 1;

/// The provider refuses to serve pages beyond this one.
pub const MAX_PROVIDER_PAGES: u32 = 500;

const EARLIEST_RELEASE_YEAR: u32 = 1900;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("page {requested} is beyond the last known page {total_pages}")]
    PageOutOfRange { requested: u32, total_pages: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    Search {
        term: String,
        page: u32,
    },
    Discover {
        sort: SortKey,
        genres: Vec<u64>,
        year: Option<u32>,
        page: u32,
    },
}

impl ListRequest {
    pub fn page(&self) -> u32 {
        match self {
            ListRequest::Search { page, .. } | ListRequest::Discover { page, .. } => *page,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        match self {
            ListRequest::Search { term, .. } => Some(term),
            ListRequest::Discover { .. } => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ListRequest::Search { .. } => "/search/movie",
            ListRequest::Discover { .. } => "/discover/movie",
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            ListRequest::Search { term, page } => {
                vec![("query", term.clone()), ("page", page.to_string())]
            }
            ListRequest::Discover {
                sort,
                genres,
                year,
                page,
            } => {
                let mut pairs = vec![
                    ("sort_by", sort.as_param().to_string()),
                    ("page", page.to_string()),
                ];
                if !genres.is_empty() {
                    let csv = genres
                        .iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join(",");
                    pairs.push(("with_genres", csv));
                }
                if let Some(year) = year {
                    pairs.push(("primary_release_year", year.to_string()));
                }
                pairs
            }
        }
    }
}

/// Current search term, filters, sort, and pagination position.
///
/// Every change to term, genres, sort or year puts the state back on the
/// first page; the page can only advance within the last known page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    term: String,
    genres: Vec<u64>,
    sort: SortKey,
    year: Option<u32>,
    page: u32,
    total_pages: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            term: String::new(),
            genres: Vec::new(),
            sort: SortKey::default(),
            year: None,
            page: FIRST_PAGE,
            total_pages: 0,
        }
    }
}

impl QueryState {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn genres(&self) -> &[u64] {
        &self.genres
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_searching(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.genres.is_empty() || self.year.is_some() || self.sort != SortKey::default()
    }

    /// Returns `true` when the applied term actually changed.
    pub fn set_term(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term == self.term {
            return false;
        }
        self.term = term.to_string();
        self.page = FIRST_PAGE;
        true
    }

    pub fn toggle_genre(&mut self, genre_id: u64) {
        match self.genres.iter().position(|id| *id == genre_id) {
            Some(index) => {
                self.genres.remove(index);
            }
            None => self.genres.push(genre_id),
        }
        self.page = FIRST_PAGE;
    }

    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if sort == self.sort {
            return false;
        }
        self.sort = sort;
        self.page = FIRST_PAGE;
        true
    }

    pub fn set_year(&mut self, year: Option<u32>) -> bool {
        if year == self.year {
            return false;
        }
        self.year = year;
        self.page = FIRST_PAGE;
        true
    }

    /// Resets genres, year and sort. Returns `true` if anything was set.
    pub fn clear_filters(&mut self) -> bool {
        if !self.has_active_filters() {
            return false;
        }
        self.genres.clear();
        self.year = None;
        self.sort = SortKey::default();
        self.page = FIRST_PAGE;
        true
    }

    pub fn record_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.min(MAX_PROVIDER_PAGES);
    }

    /// Back to the first page with term and filters kept, after the held
    /// list was lost to a failed fetch.
    pub fn rewind(&mut self) {
        self.page = FIRST_PAGE;
    }

    pub fn has_more_pages(&self) -> bool {
        self.page < self.total_pages
    }

    /// The request for the current page.
    pub fn compose(&self) -> ListRequest {
        self.compose_page(self.page)
    }

    /// Moves to `page` and composes its request, unless `page` lies past the
    /// last known page count.
    pub fn request_page(&mut self, page: u32) -> Result<ListRequest, QueryError> {
        if page < FIRST_PAGE || page > self.total_pages {
            return Err(QueryError::PageOutOfRange {
                requested: page,
                total_pages: self.total_pages,
            });
        }
        self.page = page;
        Ok(self.compose_page(page))
    }

    pub fn next_page(&mut self) -> Result<ListRequest, QueryError> {
        self.request_page(self.page + 1)
    }

    fn compose_page(&self, page: u32) -> ListRequest {
        if self.is_searching() {
            ListRequest::Search {
                term: self.term.clone(),
                page,
            }
        } else {
            ListRequest::Discover {
                sort: self.sort,
                genres: self.genres.clone(),
                year: self.year,
                page,
            }
        }
    }
}

/// Parses the year filter input; anything that is not a plausible
/// four-digit release year clears the filter.
pub fn parse_year_input(input: &str) -> Option<u32> {
    let latest = chrono::Local::now().year() as u32 + 1;
    parse_year(input, latest)
}

fn parse_year(input: &str, latest: u32) -> Option<u32> {
    let input = input.trim();
    if input.len() != 4 {
        return None;
    }
    input
        .parse::<u32>()
        .ok()
        .filter(|year| (EARLIEST_RELEASE_YEAR..=latest).contains(year))
}
