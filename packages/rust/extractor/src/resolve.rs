//! Resource reference resolution against a page origin.

use tracing::debug;
use url::Url;

/// Extract the origin (scheme + host + port) from a page URL.
///
/// Returns `None` for unparsable URLs and for URLs without a host
/// (`file:`, `data:`, `mailto:` ...), in which case references are left as
/// authored.
pub fn page_origin(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let scheme = url.scheme();
    let host = url.host_str()?;

    match url.port() {
        Some(port) => Some(format!("{scheme}://{host}:{port}")),
        None => Some(format!("{scheme}://{host}")),
    }
}

/// Resolve `candidate` against `base_origin`.
///
/// References starting with `http` are returned untouched, as is everything
/// when `base_origin` is empty. A reference that cannot be joined falls back
/// to the original text so one bad attribute never fails the page.
pub fn resolve(candidate: &str, base_origin: &str) -> String {
    if candidate.starts_with("http") || base_origin.is_empty() {
        return candidate.to_string();
    }

    match Url::parse(base_origin).and_then(|base| base.join(candidate)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            debug!(candidate, base_origin, error = %e, "unresolvable reference, keeping original");
            candidate.to_string()
        }
    }
}
