//! HTTP client for the remote scraping provider.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use assetlens_shared::{
    AssetLensError, ProviderConfig, ProviderLink, ProviderMetadata, ProviderResponse, Result,
};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("AssetLens/", env!("CARGO_PKG_VERSION"));

/// Wait for dynamic content to settle before capture.
const DEFAULT_WAIT_FOR_MS: u64 = 5_000;

/// Provider-side overall timeout.
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Accept a cached render up to one hour old.
const DEFAULT_MAX_AGE_MS: u64 = 3_600_000;

/// Explicit post-load wait before the screenshot action.
const DEFAULT_SETTLE_MS: u64 = 3_000;

/// Media tags kept even outside the main-content heuristic.
const MEDIA_TAGS: [&str; 7] = ["img", "picture", "svg", "video", "audio", "iframe", "canvas"];

// ---------------------------------------------------------------------------
// Scrape options
// ---------------------------------------------------------------------------

/// Output formats the provider can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Links,
    Screenshot,
}

/// A browser action the provider performs after page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageAction {
    Wait {
        milliseconds: u64,
    },
    Screenshot {
        #[serde(rename = "fullPage")]
        full_page: bool,
    },
}

/// Request parameters sent with every scrape.
///
/// Raw HTML is never requested; `rawHtml` is still decoded when the provider
/// includes it unasked.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub formats: Vec<OutputFormat>,
    pub wait_for_ms: u64,
    pub timeout_ms: u64,
    pub block_ads: bool,
    /// Freshness ceiling for cached renders.
    pub max_age_ms: u64,
    pub include_tags: Vec<String>,
    pub only_main_content: bool,
    pub actions: Vec<PageAction>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            formats: vec![
                OutputFormat::Markdown,
                OutputFormat::Html,
                OutputFormat::Links,
                OutputFormat::Screenshot,
            ],
            wait_for_ms: DEFAULT_WAIT_FOR_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            block_ads: true,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            include_tags: MEDIA_TAGS.iter().map(|t| t.to_string()).collect(),
            only_main_content: false,
            actions: vec![
                PageAction::Wait {
                    milliseconds: DEFAULT_SETTLE_MS,
                },
                PageAction::Screenshot { full_page: true },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [OutputFormat],
    wait_for: u64,
    timeout: u64,
    block_ads: bool,
    max_age: u64,
    include_tags: &'a [String],
    only_main_content: bool,
    actions: &'a [PageAction],
}

impl<'a> ScrapeRequest<'a> {
    fn new(url: &'a str, opts: &'a ScrapeOptions) -> Self {
        Self {
            url,
            formats: &opts.formats,
            wait_for: opts.wait_for_ms,
            timeout: opts.timeout_ms,
            block_ads: opts.block_ads,
            max_age: opts.max_age_ms,
            include_tags: &opts.include_tags,
            only_main_content: opts.only_main_content,
            actions: &opts.actions,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    raw_html: Option<String>,
    #[serde(default)]
    links: serde_json::Value,
    #[serde(default)]
    screenshot: Option<String>,
    #[serde(default)]
    metadata: Option<ProviderMetadata>,
    #[serde(default)]
    cached: Option<bool>,
}

/// Links arrive either as bare URLs or as `{href, rel, text}` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLink {
    Url(String),
    Object(ProviderLink),
}

impl From<WireLink> for ProviderLink {
    fn from(link: WireLink) -> Self {
        match link {
            WireLink::Url(href) => ProviderLink::new(href),
            WireLink::Object(link) => link,
        }
    }
}

impl From<ScrapeData> for ProviderResponse {
    fn from(data: ScrapeData) -> Self {
        Self {
            markdown: data.markdown.unwrap_or_default(),
            html: data.html.unwrap_or_default(),
            raw_html: data.raw_html.filter(|s| !s.is_empty()),
            links: decode_links(data.links),
            screenshot: data.screenshot.filter(|s| !s.is_empty()),
            metadata: data.metadata.unwrap_or_default(),
            cached: data.cached.unwrap_or(false),
        }
    }
}

/// Anything other than an array decodes to no links; entries of an
/// unrecognised shape are dropped.
fn decode_links(value: serde_json::Value) -> Vec<ProviderLink> {
    let serde_json::Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<WireLink>(item) {
            Ok(link) => Some(link.into()),
            Err(e) => {
                debug!(error = %e, "skipping undecodable provider link");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Bearer-authenticated client for the scraping provider.
///
/// The client never retries; a failed scrape is reported to the caller.
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
    options: ScrapeOptions,
    api_key: Option<String>,
}

impl ProviderClient {
    /// Create a client for the configured provider endpoint.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AssetLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            options: ScrapeOptions::default(),
            api_key: None,
        })
    }

    /// Replace the default request parameters.
    pub fn with_options(mut self, options: ScrapeOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `key` instead of reading the env var named by `api_key_env`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => self.config.api_key(),
        }
    }

    /// Scrape `url` through the provider.
    ///
    /// The credential is checked before any network I/O; a missing key is a
    /// [`AssetLensError::Config`] error.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn scrape(&self, url: &str) -> Result<ProviderResponse> {
        if url.trim().is_empty() {
            return Err(AssetLensError::validation("URL is required"));
        }

        let api_key = self.api_key()?;
        let request = ScrapeRequest::new(url, &self.options);

        info!(endpoint = %self.config.endpoint, "requesting provider scrape");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssetLensError::Network(format!("{}: {e}", self.config.endpoint)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssetLensError::Network(format!("failed to read provider body: {e}")))?;

        if !status.is_success() {
            warn!(%status, "provider returned an error status");
            return Err(AssetLensError::provider(format!("HTTP {status}: {body}")));
        }

        let envelope: ScrapeEnvelope = serde_json::from_str(&body)
            .map_err(|e| AssetLensError::parse(format!("invalid provider response: {e}")))?;

        let data = match envelope {
            ScrapeEnvelope {
                success: true,
                data: Some(data),
            } => data,
            _ => {
                return Err(AssetLensError::provider(format!(
                    "failed to scrape content: {body}"
                )));
            }
        };

        let response = ProviderResponse::from(data);

        info!(
            markdown_len = response.markdown.len(),
            html_len = response.html.len(),
            links = response.links.len(),
            cached = response.cached,
            has_screenshot = response.screenshot.is_some(),
            "provider scrape complete"
        );

        Ok(response)
    }
}
