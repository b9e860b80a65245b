use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Color;
use serde::Deserialize;

use crate::debounce::DebounceTicket;
use crate::detail::DetailTab;
use crate::listing::FetchTicket;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("moviescout").join("images"))
}

pub const BACKGROUND_DARK: Color = Color::from_rgb(0.012, 0.0, 0.122);
pub const SURFACE_DARK: Color = Color::from_rgb(0.059, 0.051, 0.137);
pub const ACCENT_LIGHT: Color = Color::from_rgb(0.808, 0.808, 0.984);
pub const ERROR_RED: Color = Color::from_rgb(0.937, 0.267, 0.267);
pub const STAR_YELLOW: Color = Color::from_rgb(0.980, 0.800, 0.082);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.659, 0.710, 0.859);

pub type MovieId = u64;

/// Genres offered by the filter panel, in display order.
pub const GENRE_CATALOGUE: [(u64, &str); 12] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (18, "Drama"),
    (14, "Fantasy"),
    (27, "Horror"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Sci-Fi"),
    (53, "Thriller"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    PopularityDesc,
    PopularityAsc,
    RatingDesc,
    RatingAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
    RevenueDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::RatingDesc,
        SortKey::RatingAsc,
        SortKey::ReleaseDateDesc,
        SortKey::ReleaseDateAsc,
        SortKey::RevenueDesc,
    ];

    /// Value of the provider's `sort_by` parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::PopularityAsc => "popularity.asc",
            SortKey::RatingDesc => "vote_average.desc",
            SortKey::RatingAsc => "vote_average.asc",
            SortKey::ReleaseDateDesc => "release_date.desc",
            SortKey::ReleaseDateAsc => "release_date.asc",
            SortKey::RevenueDesc => "revenue.desc",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::PopularityDesc => write!(f, "Popularity (High to Low)"),
            SortKey::PopularityAsc => write!(f, "Popularity (Low to High)"),
            SortKey::RatingDesc => write!(f, "Rating (High to Low)"),
            SortKey::RatingAsc => write!(f, "Rating (Low to High)"),
            SortKey::ReleaseDateDesc => write!(f, "Release Date (Newest)"),
            SortKey::ReleaseDateAsc => write!(f, "Release Date (Oldest)"),
            SortKey::RevenueDesc => write!(f, "Revenue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// One row of a search or discover listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub original_language: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub adult: bool,
}

impl MovieSummary {
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// Shown with a "NEW" badge when released in the current calendar year.
    pub fn is_released_in(&self, year: i32) -> bool {
        self.release_year() == Some(year.to_string().as_str())
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    pub fn language_label(&self) -> String {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| String::from("N/A"))
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResultList<T> {
    pub results: Vec<T>,
}

impl<T> Default for ResultList<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionRef {
    pub id: u64,
    pub name: String,
    pub poster_path: Option<String>,
}

/// Extended record for a single movie, with credits, videos,
/// recommendations and similar movies appended.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub adult: bool,
    pub status: Option<String>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    pub belongs_to_collection: Option<CollectionRef>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: ResultList<Video>,
    #[serde(default)]
    pub recommendations: ResultList<MovieSummary>,
    #[serde(default)]
    pub similar: ResultList<MovieSummary>,
}

/// A ranked row of past successful searches, as stored by the analytics backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingEntry {
    #[serde(rename = "$id")]
    pub document_id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    #[serde(default)]
    pub count: u64,
    pub movie_id: MovieId,
    #[serde(default)]
    pub title: String,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("unauthorized, check the access token")]
    Unauthorized,
    #[error("rate limited by the provider")]
    RateLimit,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Provider(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Parse(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("image cache directory unavailable: {}", e);
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn forget_pending(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    SearchInputChanged(String),
    ClearSearch,
    DebounceElapsed(DebounceTicket),
    PopularChipPressed(String),
    ToggleGenre(u64),
    SetSort(SortKey),
    YearInputChanged(String),
    ClearFilters,
    ToggleFilterPanel,
    SetViewMode(ViewMode),
    ToggleBookmarkedOnly,
    ToggleBookmark(MovieId),
    LoadMore,
    ListLoaded(FetchTicket, Result<MoviePage, ApiError>),
    TrendingLoaded(Result<Vec<TrendingEntry>, ApiError>),
    PopularLoaded(Result<Vec<MovieSummary>, ApiError>),
    OpenDetail(MovieId),
    CloseDetail,
    DetailLoaded(MovieId, Result<Box<MovieDetail>, ApiError>),
    SelectDetailTab(DetailTab),
    ToggleFullOverview,
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
}

pub fn truncate_description(description: &str, max_length: usize) -> String {
    if description.chars().count() <= max_length {
        return description.to_string();
    }
    let truncated: String = description.chars().take(max_length).collect();
    format!(
        "{}...",
        truncated
            .rfind(' ')
            .map_or(truncated.as_str(), |i| &truncated[..i])
    )
}
