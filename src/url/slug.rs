use std::path::PathBuf;
use url::Url;

/// Longest slug we will emit
pub const MAX_SLUG_LEN: usize = 100;

/// Slug used when nothing usable is left after slugifying
pub const FALLBACK_SLUG: &str = "index";

/// Extension given to every generated document
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Server-side page extensions dropped before slugifying
const WEB_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "aspx", "jsp", "jspx"];

/// Path segments that name a directory index rather than a page
const INDEX_SEGMENTS: &[&str] = &["index.html", "index.htm"];

/// Turns arbitrary text into a filesystem-safe slug
///
/// Lowercases, collapses every run of non-alphanumeric characters into one
/// hyphen, trims hyphens at both ends and caps the result at
/// [`MAX_SLUG_LEN`] characters. Empty results become [`FALLBACK_SLUG`].
///
/// Slugifying an existing slug returns it unchanged.
///
/// ```
/// use site_scribe::url::slugify;
///
/// assert_eq!(slugify("About Us!"), "about-us");
/// assert_eq!(slugify(&slugify("About Us!")), "about-us");
/// assert_eq!(slugify("***"), "index");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        // ASCII only, so byte truncation is safe
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Derives the document slug for a page URL from its final path component
///
/// ```
/// use url::Url;
/// use site_scribe::url::url_to_slug;
///
/// let url = Url::parse("https://example.com/blog/Hello_World.html").unwrap();
/// assert_eq!(url_to_slug(&url), "hello-world");
///
/// let root = Url::parse("https://example.com/").unwrap();
/// assert_eq!(url_to_slug(&root), "index");
/// ```
pub fn url_to_slug(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    slugify(strip_web_extension(last))
}

/// Folder (relative to a job's document root) that holds a page's document
///
/// The host comes first with dots turned into underscores, followed by the
/// URL's path segments.
pub fn document_folder(url: &Url) -> PathBuf {
    let mut folder = PathBuf::from(match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase().replace('.', "_"),
        _ => "unknown".to_string(),
    });

    if let Some(segments) = url.path_segments() {
        for segment in segments {
            if segment.is_empty() || INDEX_SEGMENTS.contains(&segment.to_ascii_lowercase().as_str())
            {
                continue;
            }
            folder.push(sanitize_segment(segment));
        }
    }

    folder
}

/// Relative path of a page's document: `document_folder(url)/<slug>.docx`
pub fn document_relative_path(url: &Url) -> PathBuf {
    document_folder(url).join(format!("{}.{}", url_to_slug(url), DOCUMENT_EXTENSION))
}

fn strip_web_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext)) if WEB_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => stem,
        _ => segment,
    }
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        "_".repeat(cleaned.len().max(1))
    } else {
        cleaned
    }
}
