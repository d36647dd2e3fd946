//! HTTP routes: `POST /extract-assets` and `POST /scrape-url-enhanced`.
//!
//! Both answer with JSON. Failures always use the `{success:false, error}`
//! envelope; validation problems are 400, everything else 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use assetlens_core::EnhancedScraper;
use assetlens_shared::{AssetLensError, AssetManifest};

const EXTRACT_COMPONENT: &str = "extract-assets";
const SCRAPE_COMPONENT: &str = "scrape-url-enhanced";

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct AppState {
    scraper: Arc<EnhancedScraper>,
}

impl AppState {
    pub(crate) fn new(scraper: EnhancedScraper) -> Self {
        Self {
            scraper: Arc::new(scraper),
        }
    }
}

/// Build the service router.
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/extract-assets", post(extract_assets))
        .route("/scrape-url-enhanced", post(scrape_url_enhanced))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// A failed request, tagged with the component that produced it.
struct ApiError {
    component: &'static str,
    error: AssetLensError,
}

impl ApiError {
    fn new(component: &'static str, error: AssetLensError) -> Self {
        Self { component, error }
    }

    fn rejected(component: &'static str, rejection: JsonRejection) -> Self {
        Self::new(
            component,
            AssetLensError::validation(format!("invalid request body: {}", rejection.body_text())),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.error.is_client_error() {
            warn!(component = self.component, error = %self.error, "rejected request");
            StatusCode::BAD_REQUEST
        } else {
            error!(component = self.component, error = %self.error, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = json!({
            "success": false,
            "error": self.error.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// POST /extract-assets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[instrument(skip_all, fields(request_id = %Uuid::now_v7()))]
async fn extract_assets(
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(EXTRACT_COMPONENT, e))?;

    let html = request.html.unwrap_or_default();
    let url = request.url.filter(|u| !u.is_empty());

    let assets = assetlens_extractor::extract(&html, url.as_deref())
        .map_err(|e| ApiError::new(EXTRACT_COMPONENT, e))?;

    info!(
        images = assets.images.len(),
        colors = assets.colors.len(),
        "assets extracted"
    );

    Ok(Json(json!({
        "success": true,
        "metadata": extract_metadata(&assets),
        "assets": assets,
        "message": "Assets extracted successfully from HTML content",
    })))
}

fn extract_metadata(assets: &AssetManifest) -> Value {
    json!({
        "extractor": "scraper-enhanced",
        "timestamp": timestamp(),
        "imagesCount": assets.images.len(),
        "backgroundImagesCount": assets.background_images.len(),
        "stylesheetsCount": assets.stylesheets.len(),
        "fontsCount": assets.fonts.len(),
        "colorsCount": assets.colors.len(),
        "layoutElementsCount": assets.layout_elements.len(),
    })
}

// ---------------------------------------------------------------------------
// POST /scrape-url-enhanced
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    #[serde(default)]
    url: Option<String>,
}

#[instrument(skip_all, fields(request_id = %Uuid::now_v7()))]
async fn scrape_url_enhanced(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(SCRAPE_COMPONENT, e))?;

    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(SCRAPE_COMPONENT, AssetLensError::validation("URL is required"))
        })?;

    let outcome = state
        .scraper
        .scrape_enhanced(&url)
        .await
        .map_err(|e| ApiError::new(SCRAPE_COMPONENT, e))?;

    let document = outcome.document;
    let structured = &document.structured;

    let mut metadata = Map::new();
    metadata.insert("scraper".into(), json!("firecrawl-enhanced"));
    metadata.insert("timestamp".into(), json!(timestamp()));
    metadata.insert(
        "contentLength".into(),
        json!(document.formatted_text.chars().count()),
    );
    metadata.insert("cached".into(), json!(outcome.cached));
    metadata.insert("imagesCount".into(), json!(structured.images.len()));
    metadata.insert("stylesheetsCount".into(), json!(structured.stylesheets.len()));
    metadata.insert("fontsCount".into(), json!(structured.fonts.len()));
    metadata.insert("hasScreenshot".into(), json!(structured.screenshot.is_some()));

    // Provider keys win on collision.
    if let Ok(Value::Object(provider)) = serde_json::to_value(&outcome.metadata) {
        metadata.extend(provider);
    }

    Ok(Json(json!({
        "success": true,
        "url": url,
        "content": document.formatted_text,
        "structured": document.structured,
        "metadata": metadata,
        "message": "URL scraped successfully with enhanced visual content extraction",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use assetlens_core::AssetSource;
    use assetlens_provider::ProviderClient;
    use assetlens_shared::ProviderConfig;

    /// Provider client whose key comes from `key_env`, which tests never set.
    fn provider(endpoint: &str, key_env: &str) -> ProviderClient {
        ProviderClient::new(ProviderConfig {
            api_key_env: key_env.into(),
            endpoint: endpoint.into(),
            connect_timeout_secs: 5,
        })
        .expect("build client")
    }

    fn app(provider: ProviderClient) -> Router {
        router(AppState::new(EnhancedScraper::new(
            provider,
            AssetSource::InProcess,
        )))
    }

    fn offline_app() -> Router {
        app(provider(
            "http://127.0.0.1:9/v1/scrape",
            "ASSETLENS_TEST_ROUTES_KEY_UNSET",
        ))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).expect("json body");
        (status, json)
    }

    #[tokio::test]
    async fn extract_requires_html() {
        let (status, body) = post_json(offline_app(), "/extract-assets", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().expect("error").contains("HTML content is required"));

        let (status, body) =
            post_json(offline_app(), "/extract-assets", r#"{"html":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn extract_rejects_malformed_json() {
        let (status, body) = post_json(offline_app(), "/extract-assets", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn extract_returns_manifest_and_counts() {
        let request = json!({
            "html": r#"<link rel="stylesheet" href="/s.css"><style>.x{color:#FF0000; background:rgba(0,0,0,0.5)}</style><img src="a.png"><img src=""><nav id="n"></nav>"#,
            "url": "https://ex.com/page"
        });
        let (status, body) =
            post_json(offline_app(), "/extract-assets", &request.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["assets"]["images"][0]["src"], "https://ex.com/a.png");
        assert_eq!(body["assets"]["images"].as_array().expect("images").len(), 1);
        assert_eq!(
            body["assets"]["stylesheets"][0],
            json!({"href": "https://ex.com/s.css", "originalHref": "/s.css"})
        );
        assert_eq!(body["assets"]["colors"], json!(["#FF0000", "rgba(0,0,0,0.5)"]));
        assert_eq!(body["assets"]["layoutElements"][0]["tag"], "nav");
        assert_eq!(body["metadata"]["extractor"], "scraper-enhanced");
        assert_eq!(body["metadata"]["imagesCount"], 1);
        assert_eq!(body["metadata"]["colorsCount"], 2);
        assert_eq!(body["metadata"]["layoutElementsCount"], 1);
        assert!(body["metadata"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn scrape_requires_url() {
        let (status, body) = post_json(offline_app(), "/scrape-url-enhanced", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().expect("error").contains("URL is required"));
    }

    #[tokio::test]
    async fn scrape_without_credential_is_500_and_offline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = app(provider(
            &format!("{}/v1/scrape", server.uri()),
            "ASSETLENS_TEST_ROUTES_KEY_MISSING",
        ));
        let (status, body) =
            post_json(app, "/scrape-url-enhanced", r#"{"url":"https://ex.com/"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(
            body["error"]
                .as_str()
                .expect("error")
                .contains("ASSETLENS_TEST_ROUTES_KEY_MISSING")
        );
    }

    #[tokio::test]
    async fn scrape_returns_fused_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "markdown": "Hello \u{2014} world",
                    "html": "<main class=\"content\"><img src=\"/p.png\" alt=\"P\"></main>",
                    "links": [{"href": "https://ex.com/p.png"}],
                    "screenshot": "https://shots.example.com/s.png",
                    "metadata": {"title": "Ex", "description": "D", "language": "en", "cached": "provider"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(
            provider(
                &format!("{}/v1/scrape", server.uri()),
                "ASSETLENS_TEST_ROUTES_KEY_UNSET",
            )
            .with_api_key("test-key"),
        );
        let (status, body) =
            post_json(app, "/scrape-url-enhanced", r#"{"url":"https://ex.com/"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["url"], "https://ex.com/");

        let content = body["content"].as_str().expect("content");
        assert!(content.starts_with("Title: Ex\nDescription: D\nURL: https://ex.com/"));
        assert!(content.contains("Main Content:\nHello - world"));
        assert!(content.contains("EXTRACTED IMAGES:\n- https://ex.com/p.png (alt: \"P\", class: \"\")"));

        assert_eq!(body["structured"]["title"], "Ex");
        assert_eq!(
            body["structured"]["extractedAssets"]["layoutElements"][0]["className"],
            "content"
        );
        assert_eq!(body["metadata"]["scraper"], "firecrawl-enhanced");
        assert_eq!(body["metadata"]["imagesCount"], 1);
        assert_eq!(body["metadata"]["hasScreenshot"], true);
        assert_eq!(body["metadata"]["language"], "en");
        // Provider metadata overrides computed keys.
        assert_eq!(body["metadata"]["cached"], "provider");
        assert_eq!(
            body["metadata"]["contentLength"],
            content.chars().count()
        );
    }
}
