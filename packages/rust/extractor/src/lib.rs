//! DOM-based asset extraction.
//!
//! Parses an HTML document with `scraper` and walks it for the seven asset
//! categories of an [`AssetManifest`]: images, background images, stylesheets,
//! fonts, inline style blocks, the color palette found in those blocks, and
//! structural landmark elements. Nothing is rendered, executed, or fetched.
//!
//! This crate provides:
//! - [`extract`]: HTML + page URL → [`AssetManifest`]
//! - [`resolve`]: reference resolution against a page origin
//! - [`colors`]: color literal harvesting

pub mod colors;
pub mod resolve;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use assetlens_shared::{
    AssetLensError, AssetManifest, ImageAsset, LayoutElement, LayoutTag, LinkAsset, Result,
};

pub use colors::harvest;
pub use resolve::{page_origin, resolve};

// ---------------------------------------------------------------------------
// Selectors and patterns
// ---------------------------------------------------------------------------

static IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

static BG_STYLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[style*="background-image"]"#).expect("valid selector")
});

static STYLESHEET_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="stylesheet"]"#).expect("valid selector"));

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link").expect("valid selector"));

static STYLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("style").expect("valid selector"));

static LAYOUT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("header, nav, main, section, article, aside, footer").expect("valid selector")
});

static BG_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image:\s*url\(['"]?([^'")]+)['"]?\)"#).expect("valid regex")
});

static FONT_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(woff|woff2|ttf|otf|eot)$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Extract the asset manifest of an HTML document.
///
/// Relative references are resolved against the origin of `page_url`; with
/// no usable page URL they are kept as authored. Entries whose URL attribute
/// is empty are skipped. Fails only when `html` is empty.
#[instrument(skip(html), fields(html_len = html.len(), page_url = page_url.unwrap_or_default()))]
pub fn extract(html: &str, page_url: Option<&str>) -> Result<AssetManifest> {
    if html.is_empty() {
        return Err(AssetLensError::validation("HTML content is required"));
    }

    let doc = Html::parse_document(html);
    let origin = page_url.and_then(page_origin).unwrap_or_default();

    let inline_styles = extract_inline_styles(&doc);
    let mut palette = colors::Palette::default();
    for block in &inline_styles {
        palette.extend(harvest(block));
    }

    let manifest = AssetManifest {
        images: extract_images(&doc, &origin),
        background_images: extract_background_images(&doc, &origin),
        stylesheets: extract_stylesheets(&doc, &origin),
        fonts: extract_fonts(&doc, &origin),
        inline_styles,
        colors: palette.into_vec(),
        layout_elements: extract_layout(&doc),
    };

    debug!(
        images = manifest.images.len(),
        background_images = manifest.background_images.len(),
        stylesheets = manifest.stylesheets.len(),
        fonts = manifest.fonts.len(),
        inline_styles = manifest.inline_styles.len(),
        colors = manifest.colors.len(),
        layout_elements = manifest.layout_elements.len(),
        "assets extracted"
    );

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Non-empty attribute value.
fn attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).filter(|v| !v.is_empty())
}

fn attr_or_empty(el: &ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().to_string()
}

fn extract_images(doc: &Html, origin: &str) -> Vec<ImageAsset> {
    doc.select(&IMG_SEL)
        .filter_map(|el| {
            let src = attr(&el, "src")?;
            Some(ImageAsset {
                src: resolve(src, origin),
                alt: attr_or_empty(&el, "alt"),
                class_name: attr_or_empty(&el, "class"),
                width: el.value().attr("width").map(String::from),
                height: el.value().attr("height").map(String::from),
                original_src: src.to_string(),
            })
        })
        .collect()
}

fn extract_background_images(doc: &Html, origin: &str) -> Vec<String> {
    doc.select(&BG_STYLE_SEL)
        .filter_map(|el| {
            let style = el.value().attr("style")?;
            let caps = BG_URL_RE.captures(style)?;
            let raw = caps.get(1)?.as_str();
            let resolved = resolve(raw, origin);
            (!resolved.is_empty()).then_some(resolved)
        })
        .collect()
}

fn extract_stylesheets(doc: &Html, origin: &str) -> Vec<LinkAsset> {
    doc.select(&STYLESHEET_SEL)
        .filter_map(|el| {
            let href = attr(&el, "href")?;
            Some(LinkAsset {
                href: resolve(href, origin),
                original_href: href.to_string(),
                rel: None,
            })
        })
        .collect()
}

fn extract_fonts(doc: &Html, origin: &str) -> Vec<LinkAsset> {
    doc.select(&LINK_SEL)
        .filter_map(|el| {
            let href = attr(&el, "href")?;
            let rel = attr_or_empty(&el, "rel");
            if !is_font_link(href, &rel) {
                return None;
            }
            Some(LinkAsset {
                href: resolve(href, origin),
                original_href: href.to_string(),
                rel: Some(rel),
            })
        })
        .collect()
}

/// `rel` or `href` mentions "font", or `href` names a font file.
fn is_font_link(href: &str, rel: &str) -> bool {
    rel.contains("font") || href.contains("font") || FONT_FILE_RE.is_match(href)
}

fn extract_inline_styles(doc: &Html) -> Vec<String> {
    doc.select(&STYLE_SEL)
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.is_empty())
        .collect()
}

fn extract_layout(doc: &Html) -> Vec<LayoutElement> {
    doc.select(&LAYOUT_SEL)
        .filter_map(|el| {
            let tag = LayoutTag::from_name(el.value().name())?;
            Some(LayoutElement {
                tag,
                class_name: attr_or_empty(&el, "class"),
                id: attr_or_empty(&el, "id"),
            })
        })
        .collect()
}
