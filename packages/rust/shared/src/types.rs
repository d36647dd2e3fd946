//! Value types produced by the extraction and fusion pipeline.
//!
//! Everything here is built fresh per request and serialized with camelCase
//! keys, which is the shape HTTP consumers see.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Asset manifest
// ---------------------------------------------------------------------------

/// An `<img>` found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// Absolute URL when the page origin allowed resolution.
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    /// The `src` attribute as authored.
    pub original_src: String,
}

/// A `<link>` classified as a stylesheet or font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAsset {
    pub href: String,
    pub original_href: String,
    /// Recorded for font links only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

/// The seven structural landmark tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutTag {
    Header,
    Nav,
    Main,
    Section,
    Article,
    Aside,
    Footer,
}

impl LayoutTag {
    /// All landmark tags, in the order they are listed in selectors.
    pub const ALL: [LayoutTag; 7] = [
        Self::Header,
        Self::Nav,
        Self::Main,
        Self::Section,
        Self::Article,
        Self::Aside,
        Self::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Nav => "nav",
            Self::Main => "main",
            Self::Section => "section",
            Self::Article => "article",
            Self::Aside => "aside",
            Self::Footer => "footer",
        }
    }

    /// Match an element name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One landmark node. Children are not captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    pub tag: LayoutTag,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub id: String,
}

/// Every asset category extracted from one HTML document.
///
/// List fields keep first-encountered document order. `colors` never holds
/// the same literal twice; comparison is textual, so `#FFF` and `#fff` are
/// distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    #[serde(default)]
    pub images: Vec<ImageAsset>,
    #[serde(default)]
    pub background_images: Vec<String>,
    #[serde(default)]
    pub stylesheets: Vec<LinkAsset>,
    #[serde(default)]
    pub fonts: Vec<LinkAsset>,
    #[serde(default)]
    pub inline_styles: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub layout_elements: Vec<LayoutElement>,
}

// ---------------------------------------------------------------------------
// Provider response
// ---------------------------------------------------------------------------

/// A link reported by the scraping provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ProviderLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: None,
            text: None,
        }
    }
}

/// Page metadata reported by the provider. Unknown keys are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The decoded payload of a successful provider scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub markdown: String,
    pub html: String,
    pub raw_html: Option<String>,
    pub links: Vec<ProviderLink>,
    pub screenshot: Option<String>,
    pub metadata: ProviderMetadata,
    /// Whether the provider served a cached render.
    pub cached: bool,
}

// ---------------------------------------------------------------------------
// Fused document
// ---------------------------------------------------------------------------

/// Field-by-field view of a fused document for programmatic consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDocument {
    pub title: String,
    pub description: String,
    /// Sanitized markdown body.
    pub content: String,
    pub url: String,
    pub images: Vec<ProviderLink>,
    pub stylesheets: Vec<ProviderLink>,
    pub fonts: Vec<ProviderLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// `None` when the enrichment pass failed or had no HTML to work on.
    pub extracted_assets: Option<AssetManifest>,
}

/// Result of fusing a provider response with an asset manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedDocument {
    /// One plain-text document for AI consumption.
    pub formatted_text: String,
    pub structured: StructuredDocument,
}
