//! Where the secondary asset-extraction pass runs.
//!
//! By default the extractor runs in-process. When a remote base URL is
//! configured the HTML is POSTed to `<base>/extract-assets` instead, which
//! lets one instance delegate extraction to another.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use assetlens_shared::{AssetLensError, AssetManifest, ExtractionConfig, Result};

/// Upper bound on a remote extraction round-trip.
const REMOTE_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for remote extraction requests.
const USER_AGENT: &str = concat!("AssetLens/", env!("CARGO_PKG_VERSION"));

/// Source of asset manifests for the enrichment pass.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Call the extractor directly.
    InProcess,
    /// POST to a remote `/extract-assets` endpoint.
    Remote { client: Client, base_url: String },
}

#[derive(Serialize)]
struct RemoteRequest<'a> {
    html: &'a str,
    url: &'a str,
}

#[derive(Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    assets: Option<AssetManifest>,
    #[serde(default)]
    error: Option<String>,
}

impl AssetSource {
    /// Pick the source named by the extraction config.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        match config.remote_base_url() {
            Some(base_url) => Self::remote(base_url),
            None => Ok(Self::InProcess),
        }
    }

    /// Remote source rooted at `base_url` (no trailing `/extract-assets`).
    pub fn remote(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .build()
            .map_err(|e| AssetLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::Remote {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Extract the manifest of `html` served at `page_url`.
    pub async fn extract(&self, html: &str, page_url: &str) -> Result<AssetManifest> {
        match self {
            Self::InProcess => assetlens_extractor::extract(html, Some(page_url)),
            Self::Remote { client, base_url } => {
                extract_remote(client, base_url, html, page_url).await
            }
        }
    }
}

async fn extract_remote(
    client: &Client,
    base_url: &str,
    html: &str,
    page_url: &str,
) -> Result<AssetManifest> {
    let endpoint = format!("{base_url}/extract-assets");
    debug!(%endpoint, "requesting remote asset extraction");

    let response = client
        .post(&endpoint)
        .json(&RemoteRequest {
            html,
            url: page_url,
        })
        .send()
        .await
        .map_err(|e| AssetLensError::Network(format!("{endpoint}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AssetLensError::Network(format!("{endpoint}: HTTP {status}")));
    }

    let body: RemoteResponse = response
        .json()
        .await
        .map_err(|e| AssetLensError::parse(format!("{endpoint}: invalid response: {e}")))?;

    match body {
        RemoteResponse {
            success: true,
            assets: Some(assets),
            ..
        } => Ok(assets),
        RemoteResponse { error, .. } => Err(AssetLensError::parse(format!(
            "{endpoint}: extraction unsuccessful: {}",
            error.unwrap_or_else(|| "no assets returned".into())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn in_process_resolves_against_page() {
        let manifest = AssetSource::InProcess
            .extract(r#"<img src="/a.png">"#, "https://ex.com/x/y")
            .await
            .expect("extract");
        assert_eq!(manifest.images[0].src, "https://ex.com/a.png");
    }

    #[tokio::test]
    async fn remote_posts_html_and_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/extract-assets"))
            .and(body_partial_json(json!({"html": "<p></p>", "url": "https://ex.com/"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "assets": {
                    "images": [],
                    "backgroundImages": ["https://ex.com/bg.png"],
                    "stylesheets": [],
                    "fonts": [],
                    "inlineStyles": [],
                    "colors": ["#fff"],
                    "layoutElements": [{"tag": "main", "className": "", "id": "app"}]
                },
                "metadata": {"extractor": "scraper-enhanced"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = AssetSource::remote(format!("{}/", server.uri())).expect("remote");
        let manifest = source
            .extract("<p></p>", "https://ex.com/")
            .await
            .expect("extract");

        assert_eq!(manifest.background_images, vec!["https://ex.com/bg.png"]);
        assert_eq!(manifest.colors, vec!["#fff"]);
        assert_eq!(manifest.layout_elements[0].id, "app");
    }

    #[tokio::test]
    async fn remote_error_status_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/extract-assets"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = AssetSource::remote(server.uri()).expect("remote");
        let err = source.extract("<p></p>", "https://ex.com/").await.unwrap_err();
        assert!(matches!(err, AssetLensError::Network(_)));
    }

    #[tokio::test]
    async fn remote_unsuccessful_body_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/extract-assets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "HTML content is required"})),
            )
            .mount(&server)
            .await;

        let source = AssetSource::remote(server.uri()).expect("remote");
        let err = source.extract("<p></p>", "https://ex.com/").await.unwrap_err();
        assert!(err.to_string().contains("HTML content is required"));
    }
}
