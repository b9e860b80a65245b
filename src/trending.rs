use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::media::{ApiError, MovieSummary, TrendingEntry};
use crate::settings::AnalyticsSettings;
use crate::tmdb::{image_url, ImageSize};

/// How many ranked searches the trending row shows.
pub const TRENDING_LIMIT: usize = 5;

/// Counters of past successful searches, owned by an external service.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// Entries ordered by descending count.
    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingEntry>, ApiError>;

    /// Increments the counter for `term`, creating it with a snapshot of
    /// `movie` when it does not exist yet.
    async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct DocumentList<T> {
    documents: Vec<T>,
}

#[derive(Deserialize)]
struct CounterDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    count: u64,
}

fn limit_query(limit: usize) -> String {
    json!({"method": "limit", "values": [limit]}).to_string()
}

fn order_desc_query(attribute: &str) -> String {
    json!({"method": "orderDesc", "attribute": attribute}).to_string()
}

fn equal_query(attribute: &str, value: &str) -> String {
    json!({"method": "equal", "attribute": attribute, "values": [value]}).to_string()
}

fn new_counter_document(term: &str, movie: &MovieSummary) -> serde_json::Value {
    json!({
        "documentId": "unique()",
        "data": {
            "searchTerm": term,
            "count": 1,
            "movie_id": movie.id,
            "title": movie.title,
            "poster_url": movie
                .poster_path
                .as_deref()
                .map(|path| image_url(path, ImageSize::Poster)),
        }
    })
}

/// The write that records one more search for a term.
#[derive(Debug, PartialEq)]
enum CounterWrite {
    Increment {
        document_id: String,
        body: serde_json::Value,
    },
    Create(serde_json::Value),
}

fn counter_write(
    existing: Option<&CounterDocument>,
    term: &str,
    movie: &MovieSummary,
) -> CounterWrite {
    match existing {
        Some(doc) => CounterWrite::Increment {
            document_id: doc.id.clone(),
            body: json!({"data": {"count": doc.count + 1}}),
        },
        None => CounterWrite::Create(new_counter_document(term, movie)),
    }
}

/// Appwrite database collection holding one document per search term.
#[derive(Clone)]
pub struct AppwriteClient {
    endpoint: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    api_key: Option<String>,
    http_client: Arc<reqwest::Client>,
}

impl AppwriteClient {
    pub fn from_settings(settings: &AnalyticsSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            database_id: settings.database_id.clone(),
            collection_id: settings.collection_id.clone(),
            api_key: settings.api_key.clone(),
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, self.collection_id
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id);
        match &self.api_key {
            Some(key) => builder.header("X-Appwrite-Key", key),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        match response.status().as_u16() {
            401 | 403 => Err(ApiError::Unauthorized),
            429 => Err(ApiError::RateLimit),
            s if s >= 400 => Err(ApiError::Status(s)),
            _ => Ok(response),
        }
    }

    async fn list_documents<T: for<'de> Deserialize<'de>>(
        &self,
        queries: &[String],
    ) -> Result<Vec<T>, ApiError> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let builder = self
            .request(reqwest::Method::GET, &self.documents_url())
            .query(&params);
        let list: DocumentList<T> = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(list.documents)
    }
}

#[async_trait]
impl AnalyticsBackend for AppwriteClient {
    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingEntry>, ApiError> {
        self.list_documents(&[limit_query(limit), order_desc_query("count")])
            .await
    }

    async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<(), ApiError> {
        let existing: Vec<CounterDocument> = self
            .list_documents(&[equal_query("searchTerm", term)])
            .await?;

        let builder = match counter_write(existing.first(), term, movie) {
            CounterWrite::Increment { document_id, body } => self
                .request(
                    reqwest::Method::PATCH,
                    &format!("{}/{}", self.documents_url(), document_id),
                )
                .json(&body),
            CounterWrite::Create(body) => self
                .request(reqwest::Method::POST, &self.documents_url())
                .json(&body),
        };
        self.send(builder).await?;
        Ok(())
    }
}

/// Reads the trending ranking and reports successful searches. Without a
/// configured backend it does nothing.
#[derive(Clone, Default)]
pub struct TrendingTracker {
    backend: Option<Arc<dyn AnalyticsBackend>>,
}

impl TrendingTracker {
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn from_settings(settings: Option<&AnalyticsSettings>) -> Self {
        match settings {
            Some(analytics) => Self::new(Arc::new(AppwriteClient::from_settings(analytics))),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn load(self) -> Result<Vec<TrendingEntry>, ApiError> {
        match &self.backend {
            Some(backend) => backend.top_searches(TRENDING_LIMIT).await,
            None => Ok(Vec::new()),
        }
    }

    /// Reports one successful search. Failures are logged here and never
    /// returned to the caller.
    pub async fn report(self, term: String, movie: MovieSummary) {
        let Some(backend) = &self.backend else {
            tracing::debug!(term = %term, "analytics disabled, search not reported");
            return;
        };
        if let Err(e) = backend.record_search(&term, &movie).await {
            tracing::warn!(term = %term, "failed to update search count: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FailingBackend {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl AnalyticsBackend for FailingBackend {
        async fn top_searches(&self, _limit: usize) -> Result<Vec<TrendingEntry>, ApiError> {
            Err(ApiError::Network(String::from("unreachable")))
        }

        async fn record_search(&self, _term: &str, _movie: &MovieSummary) -> Result<(), ApiError> {
            *self.calls.lock().unwrap() += 1;
            Err(ApiError::Status(500))
        }
    }

    fn movie() -> MovieSummary {
        MovieSummary {
            id: 268,
            title: String::from("Batman"),
            overview: String::new(),
            poster_path: Some(String::from("/kBf3g9crrADGMc2AMAMlLBgSm2h.jpg")),
            original_language: Some(String::from("en")),
            release_date: Some(String::from("1989-06-21")),
            vote_average: 7.2,
            adult: false,
        }
    }

    #[test]
    fn queries_use_json_syntax() {
        assert_eq!(limit_query(5), r#"{"method":"limit","values":[5]}"#);
        let order: serde_json::Value = serde_json::from_str(&order_desc_query("count")).unwrap();
        assert_eq!(order["method"], "orderDesc");
        assert_eq!(order["attribute"], "count");
        let equal: serde_json::Value =
            serde_json::from_str(&equal_query("searchTerm", "batman")).unwrap();
        assert_eq!(equal["values"][0], "batman");
    }

    #[test]
    fn new_counter_carries_movie_snapshot() {
        let doc = new_counter_document("batman", &movie());
        assert_eq!(doc["documentId"], "unique()");
        assert_eq!(doc["data"]["count"], 1);
        assert_eq!(doc["data"]["movie_id"], 268);
        assert_eq!(doc["data"]["title"], "Batman");
        assert_eq!(
            doc["data"]["poster_url"],
            "https://image.tmdb.org/t/p/w500/kBf3g9crrADGMc2AMAMlLBgSm2h.jpg"
        );
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = AppwriteClient::from_settings(&AnalyticsSettings {
            endpoint: String::from("https://cloud.appwrite.io/v1/"),
            project_id: String::from("p"),
            database_id: String::from("db"),
            collection_id: String::from("metrics"),
            api_key: None,
        });
        assert_eq!(
            client.documents_url(),
            "https://cloud.appwrite.io/v1/databases/db/collections/metrics/documents"
        );
    }

    fn analytics(api_key: Option<&str>) -> AnalyticsSettings {
        AnalyticsSettings {
            endpoint: String::from("https://cloud.appwrite.io/v1"),
            project_id: String::from("p"),
            database_id: String::from("db"),
            collection_id: String::from("metrics"),
            api_key: api_key.map(String::from),
        }
    }

    #[test]
    fn existing_counter_is_incremented() {
        let doc = CounterDocument {
            id: String::from("doc1"),
            count: 4,
        };
        assert_eq!(
            counter_write(Some(&doc), "batman", &movie()),
            CounterWrite::Increment {
                document_id: String::from("doc1"),
                body: json!({"data": {"count": 5}}),
            }
        );
    }

    #[test]
    fn missing_counter_is_created() {
        assert_eq!(
            counter_write(None, "batman", &movie()),
            CounterWrite::Create(new_counter_document("batman", &movie()))
        );
    }

    #[test]
    fn counter_document_reads_appwrite_fields() {
        let json = r#"{"documents": [{"$id": "doc1", "count": 4, "searchTerm": "batman"}]}"#;
        let list: DocumentList<CounterDocument> = serde_json::from_str(json).unwrap();
        assert_eq!(list.documents[0].id, "doc1");
        assert_eq!(list.documents[0].count, 4);
    }

    #[test]
    fn api_key_header_only_when_configured() {
        let client = AppwriteClient::from_settings(&analytics(None));
        let request = client
            .request(reqwest::Method::GET, &client.documents_url())
            .build()
            .unwrap();
        assert_eq!(request.headers()["X-Appwrite-Project"], "p");
        assert!(request.headers().get("X-Appwrite-Key").is_none());

        let client = AppwriteClient::from_settings(&analytics(Some("secret")));
        let url = format!("{}/doc1", client.documents_url());
        let request = client
            .request(reqwest::Method::PATCH, &url)
            .build()
            .unwrap();
        assert_eq!(request.headers()["X-Appwrite-Key"], "secret");
        assert_eq!(
            request.url().as_str(),
            "https://cloud.appwrite.io/v1/databases/db/collections/metrics/documents/doc1"
        );
    }

    #[tokio::test]
    async fn disabled_tracker_is_empty_and_silent() {
        let tracker = TrendingTracker::disabled();
        assert!(!tracker.is_enabled());
        assert_eq!(tracker.clone().load().await, Ok(Vec::new()));
        tracker.report(String::from("batman"), movie()).await;
    }

    #[tokio::test]
    async fn report_failure_is_swallowed() {
        let backend = Arc::new(FailingBackend::default());
        let tracker = TrendingTracker::new(backend.clone());

        tracker.clone().report(String::from("batman"), movie()).await;

        assert_eq!(*backend.calls.lock().unwrap(), 1);
        assert!(tracker.load().await.is_err());
    }
}
