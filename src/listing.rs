use std::sync::Arc;

use crate::media::{ApiError, MoviePage, MovieSummary};
use crate::query::{ListRequest, FIRST_PAGE};
use crate::tmdb::MetadataProvider;

pub const GENERIC_LIST_ERROR: &str = "Error fetching movies. Please try again later.";
const PROVIDER_FALLBACK_ERROR: &str = "Failed to fetch movies";

/// Identifies one issued list fetch; responses are matched back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub request: ListRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A newer fetch was issued after this one; nothing changed.
    Stale,
    Loaded {
        total_pages: u32,
        top: Option<MovieSummary>,
    },
    Failed(String),
}

/// The held result list and its loading/error flags.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    movies: Vec<MovieSummary>,
    loading: bool,
    error: Option<String>,
    latest_seq: u64,
}

impl ListState {
    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Page being loaded is the continuation of the held list.
    pub fn is_loading_more(&self, page: u32) -> bool {
        self.loading && page > FIRST_PAGE
    }

    pub fn begin(&mut self, request: ListRequest) -> FetchTicket {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        FetchTicket {
            seq: self.latest_seq,
            request,
        }
    }

    /// Merges a response into the held list: page one replaces it, later
    /// pages append in order without deduplication, and any failure empties
    /// it and raises the error flag.
    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<MoviePage, ApiError>) -> Outcome {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding stale list response"
            );
            return Outcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                self.error = None;
                let top = page.results.first().cloned();
                if ticket.request.page() > FIRST_PAGE {
                    self.movies.extend(page.results);
                } else {
                    self.movies = page.results;
                }
                Outcome::Loaded {
                    total_pages: page.total_pages,
                    top,
                }
            }
            Err(error) => {
                tracing::error!("error fetching movies: {}", error);
                let message = list_error_message(&error);
                self.movies.clear();
                self.error = Some(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

pub fn list_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Provider(message) if !message.is_empty() => message.clone(),
        ApiError::Provider(_) => String::from(PROVIDER_FALLBACK_ERROR),
        _ => String::from(GENERIC_LIST_ERROR),
    }
}

/// Issues exactly one provider call for the ticket's request.
pub async fn fetch_list(
    provider: Arc<dyn MetadataProvider>,
    ticket: FetchTicket,
) -> (FetchTicket, Result<MoviePage, ApiError>) {
    tracing::debug!(seq = ticket.seq, request = ?ticket.request, "fetching movie list");
    let result = provider.fetch_list(&ticket.request).await;
    (ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {}", id),
            overview: String::new(),
            poster_path: None,
            original_language: Some(String::from("en")),
            release_date: None,
            vote_average: 7.0,
            adult: false,
        }
    }

    fn page(number: u32, ids: &[u64]) -> MoviePage {
        MoviePage {
            page: number,
            total_pages: 3,
            results: ids.iter().copied().map(movie).collect(),
        }
    }

    fn search(page: u32) -> ListRequest {
        ListRequest::Search {
            term: String::from("alien"),
            page,
        }
    }

    fn ids(state: &ListState) -> Vec<u64> {
        state.movies().iter().map(|m| m.id).collect()
    }

    #[test]
    fn first_page_replaces_held_list() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(&ticket, Ok(page(1, &[9, 8])));

        let ticket = state.begin(search(1));
        let outcome = state.apply(&ticket, Ok(page(1, &[1, 2])));

        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(
            outcome,
            Outcome::Loaded {
                total_pages: 3,
                top: Some(movie(1))
            }
        );
    }

    #[test]
    fn later_page_appends_in_order() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(&ticket, Ok(page(1, &[1, 2])));

        let ticket = state.begin(search(2));
        state.apply(&ticket, Ok(page(2, &[3, 4])));

        assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn appended_duplicates_are_kept() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(&ticket, Ok(page(1, &[1, 2])));

        let ticket = state.begin(search(2));
        state.apply(&ticket, Ok(page(2, &[2, 3])));

        assert_eq!(ids(&state), vec![1, 2, 2, 3]);
    }

    #[test]
    fn transport_error_clears_list_until_next_success() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(&ticket, Ok(page(1, &[1, 2])));

        let ticket = state.begin(search(2));
        let outcome = state.apply(&ticket, Err(ApiError::Status(503)));

        assert!(state.movies().is_empty());
        assert_eq!(state.error(), Some(GENERIC_LIST_ERROR));
        assert_eq!(outcome, Outcome::Failed(String::from(GENERIC_LIST_ERROR)));
        assert!(!state.is_loading());

        let ticket = state.begin(search(1));
        state.apply(&ticket, Ok(page(1, &[5])));
        assert_eq!(state.error(), None);
        assert_eq!(ids(&state), vec![5]);
    }

    #[test]
    fn provider_envelope_message_is_surfaced() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(
            &ticket,
            Err(ApiError::Provider(String::from("Movie not found!"))),
        );
        assert_eq!(state.error(), Some("Movie not found!"));

        let ticket = state.begin(search(1));
        state.apply(&ticket, Err(ApiError::Provider(String::new())));
        assert_eq!(state.error(), Some("Failed to fetch movies"));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut state = ListState::default();
        let slow = state.begin(search(1));
        let fast = state.begin(ListRequest::Discover {
            sort: Default::default(),
            genres: vec![28],
            year: None,
            page: 1,
        });

        state.apply(&fast, Ok(page(1, &[10, 11])));
        let outcome = state.apply(&slow, Ok(page(1, &[1])));

        assert_eq!(outcome, Outcome::Stale);
        assert_eq!(ids(&state), vec![10, 11]);
    }

    #[test]
    fn begin_clears_previous_error() {
        let mut state = ListState::default();
        let ticket = state.begin(search(1));
        state.apply(&ticket, Err(ApiError::Network(String::from("offline"))));
        assert!(state.error().is_some());

        state.begin(search(1));
        assert!(state.error().is_none());
        assert!(state.is_loading());
        assert!(!state.is_loading_more(1));
        assert!(state.is_loading_more(2));
    }
}
