use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a fetchable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Parses a user-supplied seed URL
///
/// Only `http` and `https` URLs with a host are accepted. The fragment is
/// dropped so the seed has the same identity as links discovered later.
///
/// # Examples
///
/// ```
/// use site_scribe::url::parse_seed_url;
///
/// let url = parse_seed_url("https://example.com/docs#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// assert!(parse_seed_url("ftp://example.com/").is_err());
/// ```
pub fn parse_seed_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed, so `/a#top` and `/a`
/// resolve to the same frontier entry.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url)
}

/// Resolves a resource reference (such as an image `src`) without the
/// anchor-specific filtering applied to links
pub fn resolve_resource(src: &str, base_url: &Url) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() || src.to_ascii_lowercase().starts_with("data:") {
        return None;
    }

    base_url
        .join(src)
        .ok()
        .filter(|u| u.scheme() == "http" || u.scheme() == "https")
}
