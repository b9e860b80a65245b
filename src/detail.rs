use std::collections::HashSet;

use chrono::NaiveDate;

use crate::media::{ApiError, CastMember, CrewMember, MovieDetail, MovieId, MovieSummary, Video};

pub const DETAIL_ERROR: &str = "Error fetching movie details. Please try again later.";

/// Overviews longer than this are collapsed behind "Read more".
pub const OVERVIEW_COLLAPSE_CHARS: usize = 300;

const MAX_WRITERS: usize = 3;
const MAX_TOP_CAST: usize = 8;
const MAX_CREW: usize = 10;
const MAX_VIDEOS: usize = 5;
const MAX_SUGGESTIONS: usize = 6;
const WRITING_JOBS: [&str; 3] = ["Writer", "Screenplay", "Story"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Overview,
    CastAndCrew,
    Videos,
    Details,
    Similar,
}

impl DetailTab {
    pub const ALL: [DetailTab; 5] = [
        DetailTab::Overview,
        DetailTab::CastAndCrew,
        DetailTab::Videos,
        DetailTab::Details,
        DetailTab::Similar,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::CastAndCrew => "Cast & Crew",
            DetailTab::Videos => "Videos",
            DetailTab::Details => "Details",
            DetailTab::Similar => "Similar",
        }
    }
}

/// The detail overlay: closed, waiting on one identifier, showing a loaded
/// record, or showing the dismiss-only error panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Closed,
    Loading(MovieId),
    Loaded(Box<MovieDetail>),
    Failed { id: MovieId, message: String },
}

impl DetailState {
    /// Starts a new fetch cycle for `id`, dropping whatever was shown.
    pub fn open(&mut self, id: MovieId) {
        *self = DetailState::Loading(id);
    }

    /// Applies a detail response. Responses for anything other than the
    /// identifier currently loading are ignored; returns whether it applied.
    pub fn resolve(&mut self, id: MovieId, result: Result<Box<MovieDetail>, ApiError>) -> bool {
        if *self != DetailState::Loading(id) {
            tracing::debug!(id, "ignoring detail response for a movie no longer open");
            return false;
        }
        *self = match result {
            Ok(detail) => DetailState::Loaded(detail),
            Err(e) => {
                tracing::error!(id, "error fetching movie details: {}", e);
                DetailState::Failed {
                    id,
                    message: String::from(DETAIL_ERROR),
                }
            }
        };
        true
    }

    pub fn close(&mut self) {
        *self = DetailState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DetailState::Closed)
    }

    pub fn open_id(&self) -> Option<MovieId> {
        match self {
            DetailState::Closed => None,
            DetailState::Loading(id) | DetailState::Failed { id, .. } => Some(*id),
            DetailState::Loaded(detail) => Some(detail.id),
        }
    }
}

/// Where the suggestion row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Recommendations,
    Similar,
}

impl SuggestionSource {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionSource::Recommendations => "Recommended Movies",
            SuggestionSource::Similar => "Similar Movies",
        }
    }
}

impl MovieDetail {
    pub fn director(&self) -> Option<&CrewMember> {
        self.credits.crew.iter().find(|c| c.job == "Director")
    }

    pub fn writers(&self) -> Vec<&CrewMember> {
        self.credits
            .crew
            .iter()
            .filter(|c| WRITING_JOBS.contains(&c.job.as_str()))
            .take(MAX_WRITERS)
            .collect()
    }

    pub fn top_cast(&self) -> &[CastMember] {
        let end = self.credits.cast.len().min(MAX_TOP_CAST);
        &self.credits.cast[..end]
    }

    /// Crew with each person listed once, under their first credited job.
    pub fn unique_crew(&self) -> Vec<&CrewMember> {
        let mut seen = HashSet::new();
        self.credits
            .crew
            .iter()
            .filter(|c| seen.insert(c.id))
            .take(MAX_CREW)
            .collect()
    }

    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .results
            .iter()
            .find(|v| v.site == "YouTube" && v.kind == "Trailer")
    }

    pub fn youtube_videos(&self) -> Vec<&Video> {
        self.videos
            .results
            .iter()
            .filter(|v| v.site == "YouTube")
            .take(MAX_VIDEOS)
            .collect()
    }

    /// Recommendations, or similar movies when the provider has none.
    pub fn suggestions(&self) -> (SuggestionSource, &[MovieSummary]) {
        let (source, movies) = if self.recommendations.results.is_empty() {
            (SuggestionSource::Similar, &self.similar.results)
        } else {
            (
                SuggestionSource::Recommendations,
                &self.recommendations.results,
            )
        };
        (source, &movies[..movies.len().min(MAX_SUGGESTIONS)])
    }

    pub fn has_long_overview(&self) -> bool {
        self.overview.chars().count() > OVERVIEW_COLLAPSE_CHARS
    }
}

/// "March 5, 2024" for an ISO date, "Unknown" when absent or malformed.
pub fn format_release_date(date: Option<&str>) -> String {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| String::from("Unknown"))
}

pub fn format_currency(amount: u64) -> String {
    if amount == 0 {
        return String::from("Not Available");
    }
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => String::from("N/A"),
        Some(m) => match (m / 60, m % 60) {
            (0, m) => format!("{}m", m),
            (h, 0) => format!("{}h", h),
            (h, m) => format!("{}h {}m", h, m),
        },
    }
}

pub fn youtube_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", key)
}

pub fn youtube_thumbnail(key: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail() -> MovieDetail {
        serde_json::from_value(json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A hacker learns the truth.",
            "credits": {
                "cast": [
                    {"id": 1, "name": "Keanu Reeves", "character": "Neo"},
                    {"id": 2, "name": "Laurence Fishburne", "character": "Morpheus"},
                    {"id": 3, "name": "Carrie-Anne Moss"},
                    {"id": 4, "name": "Hugo Weaving"},
                    {"id": 5, "name": "Joe Pantoliano"},
                    {"id": 6, "name": "Marcus Chong"},
                    {"id": 7, "name": "Julian Arahanga"},
                    {"id": 8, "name": "Matt Doran"},
                    {"id": 9, "name": "Gloria Foster"}
                ],
                "crew": [
                    {"id": 20, "name": "Lilly Wachowski", "job": "Director"},
                    {"id": 20, "name": "Lilly Wachowski", "job": "Writer"},
                    {"id": 21, "name": "Lana Wachowski", "job": "Director"},
                    {"id": 21, "name": "Lana Wachowski", "job": "Screenplay"},
                    {"id": 22, "name": "Someone", "job": "Story"},
                    {"id": 23, "name": "Another", "job": "Writer"},
                    {"id": 24, "name": "Bill Pope", "job": "Director of Photography"}
                ]
            },
            "videos": {"results": [
                {"id": "a", "key": "teaser1", "site": "YouTube", "type": "Teaser"},
                {"id": "b", "key": "vimeo1", "site": "Vimeo", "type": "Trailer"},
                {"id": "c", "key": "trailer1", "site": "YouTube", "type": "Trailer"}
            ]},
            "recommendations": {"results": []},
            "similar": {"results": [
                {"id": 1}, {"id": 2}, {"id": 3}, {"id": 4},
                {"id": 5}, {"id": 6}, {"id": 7}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn resolve_applies_only_to_open_movie() {
        let mut state = DetailState::default();
        state.open(1);
        state.open(2);

        assert!(!state.resolve(1, Ok(Box::new(detail()))));
        assert_eq!(state, DetailState::Loading(2));

        assert!(state.resolve(2, Err(ApiError::Status(404))));
        assert_eq!(
            state,
            DetailState::Failed {
                id: 2,
                message: String::from(DETAIL_ERROR)
            }
        );
    }

    #[test]
    fn late_response_after_close_is_ignored() {
        let mut state = DetailState::default();
        state.open(603);
        state.close();
        assert!(!state.resolve(603, Ok(Box::new(detail()))));
        assert!(!state.is_open());
        assert_eq!(state.open_id(), None);
    }

    #[test]
    fn loaded_detail_reports_its_id() {
        let mut state = DetailState::default();
        state.open(603);
        assert!(state.resolve(603, Ok(Box::new(detail()))));
        assert_eq!(state.open_id(), Some(603));
    }

    #[test]
    fn derived_credits() {
        let detail = detail();
        assert_eq!(detail.director().map(|d| d.name.as_str()), Some("Lilly Wachowski"));

        let writers: Vec<&str> = detail.writers().iter().map(|c| c.job.as_str()).collect();
        assert_eq!(writers, vec!["Writer", "Screenplay", "Story"]);

        assert_eq!(detail.top_cast().len(), 8);

        let crew: Vec<u64> = detail.unique_crew().iter().map(|c| c.id).collect();
        assert_eq!(crew, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn trailer_is_first_youtube_trailer() {
        let detail = detail();
        assert_eq!(detail.trailer().map(|v| v.key.as_str()), Some("trailer1"));
        assert_eq!(detail.youtube_videos().len(), 2);
    }

    #[test]
    fn suggestions_fall_back_to_similar() {
        let detail = detail();
        let (source, movies) = detail.suggestions();
        assert_eq!(source, SuggestionSource::Similar);
        assert_eq!(movies.len(), 6);
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(format_release_date(Some("2024-03-05")), "March 5, 2024");
        assert_eq!(format_release_date(Some("")), "Unknown");
        assert_eq!(format_release_date(None), "Unknown");
        assert_eq!(format_currency(0), "Not Available");
        assert_eq!(format_currency(999), "$999");
        assert_eq!(format_currency(63_000_000), "$63,000,000");
        assert_eq!(format_runtime(Some(136)), "2h 16m");
        assert_eq!(format_runtime(Some(120)), "2h");
        assert_eq!(format_runtime(None), "N/A");
    }

    #[test]
    fn long_overview_collapses() {
        let mut detail = detail();
        assert!(!detail.has_long_overview());
        detail.overview = "x".repeat(OVERVIEW_COLLAPSE_CHARS + 1);
        assert!(detail.has_long_overview());
    }
}
