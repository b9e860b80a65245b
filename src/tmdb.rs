use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::media::{ApiError, MovieDetail, MovieId, MoviePage, MovieSummary};
use crate::query::ListRequest;
use crate::settings::AppSettings;

const API_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const DETAIL_APPENDS: &str = "credits,videos,recommendations,similar";
const POPULAR_SUGGESTIONS: usize = 4;

/// The movie metadata provider as seen by the list, detail and
/// suggestion flows.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_list(&self, request: &ListRequest) -> Result<MoviePage, ApiError>;

    async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, ApiError>;

    /// The first few currently popular movies, used as search suggestions.
    async fn fetch_popular(&self) -> Result<Vec<MovieSummary>, ApiError>;
}

#[derive(Deserialize)]
struct PopularResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Clone, Copy)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Profile,
}

pub fn image_url(path: &str, size: ImageSize) -> String {
    let size_path = match size {
        ImageSize::Poster => "w500",
        ImageSize::Backdrop => "original",
        ImageSize::Profile => "w185",
    };
    format!("{}/{}{}", IMAGE_BASE_URL, size_path, path)
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

fn status_error(status: u16) -> Option<ApiError> {
    match status {
        401 => Some(ApiError::Unauthorized),
        429 => Some(ApiError::RateLimit),
        s if s >= 400 => Some(ApiError::Status(s)),
        _ => None,
    }
}

/// Interprets a list response body. A body of the form
/// `{"Response": "False", "Error": ...}` is an application-level failure
/// even when the HTTP status was a success.
pub fn parse_list_envelope(body: serde_json::Value) -> Result<MoviePage, ApiError> {
    if body.get("Response").and_then(|v| v.as_str()) == Some("False") {
        let message = body
            .get("Error")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ApiError::Provider(message));
    }
    serde_json::from_value(body).map_err(|e| ApiError::Parse(e.to_string()))
}

#[derive(Clone)]
pub struct TmdbClient {
    access_token: String,
    base_url: String,
    language: String,
    http_client: Arc<reqwest::Client>,
}

impl TmdbClient {
    pub fn new(access_token: String, language: String) -> Self {
        Self {
            access_token,
            base_url: String::from(API_BASE_URL),
            language,
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let language = if settings.language.is_empty() {
            String::from("en-US")
        } else {
            settings.language.clone()
        };
        Self::new(settings.tmdb_token.clone(), language)
    }

    async fn fetch_response(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .query(&[("language", self.language.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match status_error(response.status().as_u16()) {
            Some(error) => Err(error),
            None => Ok(response),
        }
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.fetch_response(endpoint, params)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn fetch_list(&self, request: &ListRequest) -> Result<MoviePage, ApiError> {
        let body: serde_json::Value = self
            .fetch_json(request.path(), &request.query_pairs())
            .await?;
        parse_list_envelope(body)
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, ApiError> {
        tracing::debug!(id, "fetching movie detail");
        self.fetch_json(
            &format!("/movie/{}", id),
            &[("append_to_response", String::from(DETAIL_APPENDS))],
        )
        .await
    }

    async fn fetch_popular(&self) -> Result<Vec<MovieSummary>, ApiError> {
        let response: PopularResponse = self
            .fetch_json("/movie/popular", &[("page", String::from("1"))])
            .await?;
        Ok(response
            .results
            .into_iter()
            .take(POPULAR_SUGGESTIONS)
            .collect())
    }
}
