//! End-to-end enhanced scrape: URL → provider → asset enrichment → fused document.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use assetlens_provider::ProviderClient;
use assetlens_shared::{
    AppConfig, AssetLensError, AssetManifest, FusedDocument, ProviderMetadata, ProviderResponse,
    Result,
};

use crate::assets::AssetSource;
use crate::fuse::fuse;

/// Result of one enhanced scrape.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// The URL that was scraped.
    pub url: String,
    /// Formatted text plus structured view.
    pub document: FusedDocument,
    /// Provider page metadata, unsanitized.
    pub metadata: ProviderMetadata,
    /// Whether the provider served a cached render.
    pub cached: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Scrapes a URL through the provider and enriches it with DOM-derived assets.
pub struct EnhancedScraper {
    provider: ProviderClient,
    assets: AssetSource,
}

impl EnhancedScraper {
    pub fn new(provider: ProviderClient, assets: AssetSource) -> Self {
        Self { provider, assets }
    }

    /// Build a scraper from the `[provider]` and `[extraction]` config sections.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            ProviderClient::new(config.provider.clone())?,
            AssetSource::from_config(&config.extraction)?,
        ))
    }

    /// Run the enhanced scrape for `url`.
    ///
    /// 1. Scrape through the provider (errors abort)
    /// 2. Extract assets from the provider's HTML (errors are logged and dropped)
    /// 3. Fuse both into one document
    #[instrument(skip_all, fields(url = %url))]
    pub async fn scrape_enhanced(&self, url: &str) -> Result<ScrapeOutcome> {
        if url.trim().is_empty() {
            return Err(AssetLensError::validation("URL is required"));
        }

        let start = Instant::now();
        info!("scraping with provider");

        let response = self.provider.scrape(url).await?;
        let assets = self.enrich(&response, url).await;
        let document = fuse(&response, assets, url);

        let outcome = ScrapeOutcome {
            url: url.to_string(),
            document,
            metadata: response.metadata,
            cached: response.cached,
            elapsed: start.elapsed(),
        };

        info!(
            content_len = outcome.document.formatted_text.len(),
            enriched = outcome.document.structured.extracted_assets.is_some(),
            cached = outcome.cached,
            elapsed_ms = outcome.elapsed.as_millis(),
            "enhanced scrape complete"
        );

        Ok(outcome)
    }

    /// Best-effort secondary pass. Never fails the scrape.
    async fn enrich(&self, response: &ProviderResponse, url: &str) -> Option<AssetManifest> {
        if response.html.is_empty() {
            return None;
        }

        match self.assets.extract(&response.html, url).await {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(
                    component = "scrape-url-enhanced",
                    error = %e,
                    "failed to extract additional assets"
                );
                None
            }
        }
    }
}
