//! Content fusion: provider response + asset manifest → one document.
//!
//! The provider's flat link list is classified on its own (images,
//! stylesheets, fonts), so a document can always be produced even when DOM
//! extraction is unavailable. When a manifest is present its sections are
//! appended. Sections with nothing to list are left out entirely.

use std::collections::HashSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use assetlens_provider::sanitize_quotes;
use assetlens_shared::{
    AssetManifest, FusedDocument, LayoutElement, ProviderLink, ProviderResponse,
    StructuredDocument,
};

/// Characters of raw HTML kept in the formatted document.
pub const RAW_HTML_PREVIEW_CHARS: usize = 2000;

/// Colors listed in the palette section.
pub const PALETTE_LIMIT: usize = 10;

static IMAGE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(jpg|jpeg|png|gif|svg|webp|bmp|ico)$").expect("valid regex")
});

static FONT_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(woff|woff2|ttf|otf|eot)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Link classification
// ---------------------------------------------------------------------------

/// Provider links grouped by asset kind. A link may land in several groups,
/// but each `href` appears at most once per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGroups {
    pub images: Vec<ProviderLink>,
    pub stylesheets: Vec<ProviderLink>,
    pub fonts: Vec<ProviderLink>,
}

/// Classify provider links by extension and keyword.
///
/// Repeated hrefs keep their first occurrence.
pub fn classify_links(links: &[ProviderLink]) -> LinkGroups {
    let mut groups = LinkGroups::default();
    let mut seen_images = HashSet::new();
    let mut seen_stylesheets = HashSet::new();
    let mut seen_fonts = HashSet::new();

    for link in links {
        if is_image_href(&link.href) {
            push_unique(&mut groups.images, &mut seen_images, link);
        }
        if link.rel.as_deref() == Some("stylesheet") || link.href.contains(".css") {
            push_unique(&mut groups.stylesheets, &mut seen_stylesheets, link);
        }
        if link.href.contains("font") || FONT_EXT_RE.is_match(&link.href) {
            push_unique(&mut groups.fonts, &mut seen_fonts, link);
        }
    }
    groups
}

fn push_unique<'a>(
    group: &mut Vec<ProviderLink>,
    seen: &mut HashSet<&'a str>,
    link: &'a ProviderLink,
) {
    if seen.insert(link.href.as_str()) {
        group.push(link.clone());
    }
}

fn is_image_href(href: &str) -> bool {
    IMAGE_EXT_RE.is_match(href)
}

// ---------------------------------------------------------------------------
// Fusion
// ---------------------------------------------------------------------------

/// Fuse a provider response with an optional asset manifest for `url`.
///
/// Title, description and markdown body are passed through
/// [`sanitize_quotes`] in both the formatted text and the structured view.
pub fn fuse(response: &ProviderResponse, assets: Option<AssetManifest>, url: &str) -> FusedDocument {
    let title = sanitize_quotes(response.metadata.title.as_deref().unwrap_or_default());
    let description =
        sanitize_quotes(response.metadata.description.as_deref().unwrap_or_default());
    let content = sanitize_quotes(&response.markdown);
    let links = classify_links(&response.links);

    let structured = StructuredDocument {
        title,
        description,
        content,
        url: url.to_string(),
        images: links.images,
        stylesheets: links.stylesheets,
        fonts: links.fonts,
        raw_html: response.raw_html.clone(),
        screenshot: response.screenshot.clone(),
        extracted_assets: assets,
    };

    FusedDocument {
        formatted_text: format_document(&structured),
        structured,
    }
}

/// Render the plain-text document in its fixed section order.
fn format_document(doc: &StructuredDocument) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Title: {}\nDescription: {}\nURL: {}",
        doc.title, doc.description, doc.url
    );

    section(
        &mut out,
        "IMAGES FOUND",
        doc.images.iter().map(|img| {
            let alt = img.text.as_deref().filter(|t| !t.is_empty()).unwrap_or("N/A");
            format!("- {} (alt: \"{alt}\")", img.href)
        }),
    );
    section(
        &mut out,
        "STYLESHEETS",
        doc.stylesheets.iter().map(|css| format!("- {}", css.href)),
    );
    section(
        &mut out,
        "FONTS",
        doc.fonts.iter().map(|font| format!("- {}", font.href)),
    );

    if let Some(assets) = &doc.extracted_assets {
        section(
            &mut out,
            "EXTRACTED IMAGES",
            assets.images.iter().map(|img| {
                format!(
                    "- {} (alt: \"{}\", class: \"{}\")",
                    img.src, img.alt, img.class_name
                )
            }),
        );
        section(
            &mut out,
            "BACKGROUND IMAGES",
            assets.background_images.iter().map(|bg| format!("- {bg}")),
        );

        let palette: Vec<&str> = assets
            .colors
            .iter()
            .take(PALETTE_LIMIT)
            .map(String::as_str)
            .collect();
        if !palette.is_empty() {
            section(&mut out, "COLOR PALETTE", std::iter::once(palette.join(", ")));
        }

        section(
            &mut out,
            "LAYOUT STRUCTURE",
            assets.layout_elements.iter().map(layout_line),
        );
    }

    let _ = write!(out, "\n\nMain Content:\n{}", doc.content);

    let raw = match &doc.raw_html {
        Some(html) => format!("{}...", truncate_chars(html, RAW_HTML_PREVIEW_CHARS)),
        None => "Not available".to_string(),
    };
    let _ = write!(out, "\n\nRAW HTML STRUCTURE:\n{raw}");

    out.trim().to_string()
}

/// Append `heading` and its lines, or nothing when there are no lines.
fn section(out: &mut String, heading: &str, lines: impl Iterator<Item = String>) {
    let body = lines.collect::<Vec<_>>();
    if body.is_empty() {
        return;
    }
    let _ = write!(out, "\n\n{heading}:\n{}", body.join("\n"));
}

fn layout_line(el: &LayoutElement) -> String {
    let mut line = format!("- <{}>", el.tag);
    if !el.class_name.is_empty() {
        let _ = write!(line, " class=\"{}\"", el.class_name);
    }
    if !el.id.is_empty() {
        let _ = write!(line, " id=\"{}\"", el.id);
    }
    line
}

/// First `max` characters of `s`, never splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
