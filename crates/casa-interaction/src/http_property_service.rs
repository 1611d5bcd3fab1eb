//! HttpPropertyService - reqwest implementation of the property service.
//!
//! Talks to the backend's JSON endpoints:
//!
//! | Operation | Endpoint |
//! | --- | --- |
//! | search | `POST /api/search` |
//! | chat turn | `POST /agent/chat` |
//! | image generation | `POST /api/generate-image` |
//! | history | `POST /api/history` |

use async_trait::async_trait;
use casa_core::chat::ChatReply;
use casa_core::config::{ApiVariant, ClientConfig};
use casa_core::error::{CasaError, Result};
use casa_core::history::HistoryRow;
use casa_core::image::{GeneratedImage, normalize_image_ref};
use casa_core::listing::Listing;
use casa_core::search::{Diagnostics, SearchMode, SearchOutcome};
use casa_core::service::PropertyService;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SEARCH_PATH: &str = "api/search";
const CHAT_PATH: &str = "agent/chat";
const GENERATE_IMAGE_PATH: &str = "api/generate-image";
const HISTORY_PATH: &str = "api/history";

/// Gateway to the remote property service over HTTP+JSON.
///
/// Holds no per-call state; cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpPropertyService {
    client: Client,
    base_url: Url,
    api_variant: ApiVariant,
}

impl HttpPropertyService {
    /// Creates a service for `base_url` with reqwest's default client.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
            api_variant: ApiVariant::default(),
        })
    }

    /// Builds a service from the loaded client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10).min(config.request_timeout()))
            .build()
            .map_err(|e| CasaError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            api_variant: config.api_variant,
        })
    }

    /// Overrides the backend contract after construction.
    pub fn with_api_variant(mut self, api_variant: ApiVariant) -> Self {
        self.api_variant = api_variant;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Turns any image reference into a URL a renderer can fetch.
    ///
    /// Storage references go through the image proxy; relative paths are
    /// resolved against the base URL; data URIs and absolute URLs pass through.
    pub fn resolve_image_url(&self, image_ref: &str) -> Result<Url> {
        let normalized = normalize_image_ref(image_ref);
        if let Ok(absolute) = Url::parse(&normalized) {
            return Ok(absolute);
        }
        self.endpoint(&normalized)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| CasaError::config(format!("Invalid endpoint path '{path}': {e}")))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CasaError::network(format!("Request to /{path} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::debug!("/{} answered {}: {}", path, status, body_text);
            return Err(map_http_error(status, &body_text));
        }

        response.json::<R>().await.map_err(|err| {
            if err.is_timeout() {
                CasaError::network(format!("Reading /{path} response timed out: {err}"))
            } else {
                CasaError::service(
                    Some(status.as_u16()),
                    format!("Malformed response from /{path}: {err}"),
                )
            }
        })
    }
}

#[async_trait]
impl PropertyService for HttpPropertyService {
    async fn search(&self, query: &str, mode: Option<SearchMode>) -> Result<SearchOutcome> {
        let request = SearchRequest {
            query,
            mode: match self.api_variant {
                ApiVariant::Legacy => mode,
                ApiVariant::Unified => None,
            },
        };
        let response: SearchResponse = self.post_json(SEARCH_PATH, &request).await?;
        Ok(response.into_outcome())
    }

    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        let request = ChatRequest {
            message,
            session_id,
        };
        let response: ChatResponse = self.post_json(CHAT_PATH, &request).await?;
        Ok(ChatReply::from_raw(
            response.response,
            response.used_prompt.filter(|p| !p.trim().is_empty()),
            response.tool_details.filter(|d| !d.is_null()),
        ))
    }

    async fn generate_image(&self, description: &str) -> Result<GeneratedImage> {
        let request = GenerateImageRequest { description };
        let response: GenerateImageResponse = self
            .post_json(GENERATE_IMAGE_PATH, &request)
            .await
            .map_err(into_generation_error)?;

        match response.image {
            Some(image) if !image.trim().is_empty() => Ok(GeneratedImage {
                image_ref: normalize_image_ref(&image),
            }),
            _ => Err(CasaError::generation("Service returned no image")),
        }
    }

    async fn query_history(&self, where_clause: &str) -> Result<Vec<HistoryRow>> {
        let request = HistoryRequest { where_clause };
        let response: HistoryResponse = self.post_json(HISTORY_PATH, &request).await?;
        Ok(response.rows)
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<SearchMode>,
}

#[derive(Deserialize)]
struct SearchResponse {
    listings: Option<Vec<Listing>>,
    sql: Option<String>,
    /// `SELECT DISTINCT city` can include a NULL.
    available_cities: Option<Vec<Option<String>>>,
    nl_answer: Option<String>,
    details: Option<Value>,
}

impl SearchResponse {
    fn into_outcome(self) -> SearchOutcome {
        let details = self.details.filter(|d| !d.is_null());
        let top_level = Diagnostics {
            generated_query: self.sql.filter(|s| !s.trim().is_empty()),
            natural_language_answer: self.nl_answer.filter(|s| !s.trim().is_empty()),
            ..Default::default()
        };
        let diagnostics = match &details {
            Some(details) => top_level.merge_missing(Diagnostics::from_details(details)),
            None => top_level,
        };

        let mut listings = self.listings.unwrap_or_default();
        for listing in &mut listings {
            listing.normalize_image_ref();
        }

        SearchOutcome {
            listings,
            diagnostics,
            available_cities: self
                .available_cities
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter(|city| !city.trim().is_empty())
                .collect(),
            details,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: String,
    used_prompt: Option<String>,
    tool_details: Option<Value>,
}

#[derive(Serialize)]
struct GenerateImageRequest<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct GenerateImageResponse {
    image: Option<String>,
}

#[derive(Serialize)]
struct HistoryRequest<'a> {
    where_clause: &'a str,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    rows: Vec<HistoryRow>,
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // A trailing slash makes `join` append to the base path instead of replacing it.
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| CasaError::config(format!("Invalid base URL '{raw}': {e}")))
}

fn map_http_error(status: StatusCode, body: &str) -> CasaError {
    let message = extract_error_message(body)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() <= 500).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Request failed")
            )
        });
    CasaError::service(Some(status.as_u16()), message)
}

/// Pulls the human-readable message out of common error body shapes:
/// `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`, `{"error": {"message": "..."}}`,
/// `{"error": "..."}` and `{"message": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("detail") {
        Some(Value::String(detail)) => Some(detail.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    };
    message
        .or_else(|| match value.get("error") {
            Some(Value::String(error)) => Some(error.clone()),
            Some(error) => error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            None => None,
        })
        .or_else(|| value.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
}

fn into_generation_error(err: CasaError) -> CasaError {
    match err {
        CasaError::Service { message, .. } => CasaError::generation(message),
        CasaError::Network(message) => CasaError::generation(message),
        other => CasaError::generation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let service = HttpPropertyService::new("https://homes.example.com/app").unwrap();
        assert_eq!(
            service.endpoint(SEARCH_PATH).unwrap().as_str(),
            "https://homes.example.com/app/api/search"
        );
        assert_eq!(
            service.endpoint("/agent/chat").unwrap().as_str(),
            "https://homes.example.com/app/agent/chat"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpPropertyService::new("not a url").unwrap_err();
        assert!(matches!(err, CasaError::Config(_)));
    }

    #[test]
    fn test_resolve_image_url() {
        let service = HttpPropertyService::new("http://localhost:8080").unwrap();
        assert_eq!(
            service.resolve_image_url("gs://bucket/a.jpg").unwrap().as_str(),
            "http://localhost:8080/api/image?gcs_uri=gs%3A%2F%2Fbucket%2Fa.jpg"
        );
        assert_eq!(
            service.resolve_image_url("https://cdn.example.com/a.jpg").unwrap().as_str(),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_search_request_mode_is_optional() {
        let with_mode = SearchRequest {
            query: "loft",
            mode: Some(SearchMode::VertexSearch),
        };
        assert_eq!(
            serde_json::to_value(&with_mode).unwrap(),
            json!({"query": "loft", "mode": "vertex_search"})
        );
        let without_mode = SearchRequest {
            query: "loft",
            mode: None,
        };
        assert_eq!(serde_json::to_value(&without_mode).unwrap(), json!({"query": "loft"}));
    }

    #[test]
    fn test_chat_and_history_request_field_names() {
        let chat = ChatRequest {
            message: "hi",
            session_id: "session-1",
        };
        assert_eq!(
            serde_json::to_value(&chat).unwrap(),
            json!({"message": "hi", "session_id": "session-1"})
        );
        let history = HistoryRequest {
            where_clause: "user_prompt ILIKE '%a%'",
        };
        assert_eq!(
            serde_json::to_value(&history).unwrap(),
            json!({"where_clause": "user_prompt ILIKE '%a%'"})
        );
    }

    #[test]
    fn test_no_match_response_is_a_valid_outcome() {
        let response: SearchResponse = serde_json::from_value(json!({
            "listings": [],
            "sql": "SELECT * FROM listings WHERE city = 'Bern'",
            "available_cities": ["Geneva", "Zurich"]
        }))
        .unwrap();
        let outcome = response.into_outcome();
        assert!(outcome.listings.is_empty());
        assert_eq!(
            outcome.diagnostics.generated_query.as_deref(),
            Some("SELECT * FROM listings WHERE city = 'Bern'")
        );
        assert_eq!(outcome.available_cities, vec!["Geneva", "Zurich"]);
    }

    #[test]
    fn test_document_store_listings_and_null_cities_decode() {
        let body = r#"{
            "listings": [
                {"id": "doc-7", "title": "Attic", "description": null, "price": 3200.0,
                 "city": "Lausanne", "canton": null, "bedrooms": 3.0},
                {"id": 8.0, "title": null, "city": null}
            ],
            "sql": null,
            "available_cities": ["Geneva", null, "Zurich"]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let outcome = response.into_outcome();

        assert_eq!(outcome.listings.len(), 2);
        assert_eq!(outcome.listings[0].bedrooms, Some(3));
        assert_eq!(outcome.listings[0].description, "");
        assert_eq!(outcome.listings[1].display_key(1), "8");
        assert_eq!(outcome.listings[1].city, "");
        assert_eq!(outcome.diagnostics.generated_query, None);
        assert_eq!(outcome.available_cities, vec!["Geneva", "Zurich"]);
    }

    #[test]
    fn test_null_listings_is_an_empty_result() {
        let response: SearchResponse =
            serde_json::from_value(json!({"listings": null, "sql": "SELECT 1"})).unwrap();
        assert!(response.into_outcome().listings.is_empty());
    }

    #[test]
    fn test_outcome_merges_details_and_proxies_images() {
        let response: SearchResponse = serde_json::from_value(json!({
            "listings": [{"id": 1, "title": "Loft", "image_gcs_uri": "gs://b/1.jpg"}],
            "nl_answer": "One loft",
            "details": {"sql": "SELECT 1", "explanation": "template match"}
        }))
        .unwrap();
        let outcome = response.into_outcome();
        assert_eq!(outcome.diagnostics.generated_query.as_deref(), Some("SELECT 1"));
        assert_eq!(outcome.diagnostics.explanation.as_deref(), Some("template match"));
        assert_eq!(outcome.diagnostics.natural_language_answer.as_deref(), Some("One loft"));
        assert!(
            outcome.listings[0]
                .image_ref
                .as_deref()
                .unwrap()
                .starts_with("/api/image?gcs_uri=")
        );
        assert!(outcome.details.is_some());
    }

    #[test]
    fn test_map_http_error_prefers_backend_detail() {
        let err = map_http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Database Connection Failed: timeout"}"#,
        );
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.user_message(), "Database Connection Failed: timeout");

        let err = map_http_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "query"], "msg": "field required"}]}"#,
        );
        assert_eq!(err.user_message(), "field required");

        let err = map_http_error(StatusCode::BAD_GATEWAY, r#"{"error": {"message": "upstream down"}}"#);
        assert_eq!(err.user_message(), "upstream down");
    }

    #[test]
    fn test_map_http_error_without_body_uses_status() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.user_message(), "503 Service Unavailable");
    }

    #[test]
    fn test_generation_errors_are_rescoped() {
        let err = into_generation_error(CasaError::service(Some(500), "quota exceeded"));
        assert_eq!(err, CasaError::generation("quota exceeded"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let service = HttpPropertyService::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = service.search("loft", None).await.unwrap_err();
        assert!(err.is_network(), "expected network error, got {err:?}");

        let err = service.generate_image("loft").await.unwrap_err();
        assert!(err.is_generation());
    }
}
