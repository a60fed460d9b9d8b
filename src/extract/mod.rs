//! Content extraction and document synthesis
//!
//! Raw markup goes in, a [`StructuredDocument`] comes out:
//! - `content` isolates the subtree to convert and skips page chrome
//! - `synthesize` walks it into blocks and inline runs
//! - `heuristics` holds the emphasis and column guesses
//! - `layout` caps spacing and adds page breaks
//! - `images` fetches the pictures a document references
//!
//! Parsed HTML is not `Send`, so these entry points take markup as `&str` and
//! never hold a parsed tree across an `.await`.

mod content;
mod heuristics;
mod images;
mod layout;
mod synthesize;

pub use content::{extract_content, ContentRoot};
pub use heuristics::{is_emphasized_heading, LayoutRules};
pub use images::{download_images, plan_images, ImageMap, ImageRequest, IMAGES_DIR};
pub use layout::optimize_layout;
pub use synthesize::{synthesize, SynthesisContext};

use crate::document::StructuredDocument;
use scraper::Html;
use url::Url;

/// Per-page extraction settings
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    /// CSS selector for the main content
    pub selector: Option<&'a str>,
    pub include_images: bool,
}

/// Images under the content root that a document would reference
pub fn plan_page_images(html: &str, page_url: &Url, selector: Option<&str>) -> Vec<ImageRequest> {
    let document = Html::parse_document(html);
    let root = extract_content(&document, selector);
    plan_images(&root, page_url)
}

/// Builds the structured document for a page's markup
pub fn build_document(
    html: &str,
    page_url: &Url,
    options: ExtractOptions<'_>,
    images: &ImageMap,
    rules: &LayoutRules,
) -> StructuredDocument {
    let document = Html::parse_document(html);
    let root = extract_content(&document, options.selector);
    let ctx = SynthesisContext {
        base_url: page_url,
        include_images: options.include_images,
        images,
        rules,
    };
    synthesize(&root, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::document::Block;

    #[test]
    fn test_build_document_respects_selector() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a></nav>
            <div id="content"><h1>Title</h1><p>Body text.</p></div>
            <div id="other"><p>Elsewhere</p></div>
        </body></html>"#;
        let url = Url::parse("https://example.com/").unwrap();
        let rules = LayoutRules::from_config(&LayoutConfig::default()).unwrap();

        let doc = build_document(
            html,
            &url,
            ExtractOptions {
                selector: Some("#content"),
                include_images: false,
            },
            &ImageMap::new(),
            &rules,
        );

        assert_eq!(doc.content_blocks(), 2);
        assert!(matches!(doc.blocks[0], Block::Heading { level: 1, .. }));
        assert!(!doc.plain_text().contains("Elsewhere"));
        assert!(!doc.plain_text().contains("Home"));
    }

    #[test]
    fn test_plan_page_images_limited_to_selector() {
        let html = r#"<html><body>
            <img src="/banner.png">
            <main><p>Caption</p><img src="/inside.png"></main>
        </body></html>"#;
        let url = Url::parse("https://example.com/").unwrap();
        let plan = plan_page_images(html, &url, Some("main"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].src, "/inside.png");
        assert_eq!(plan[0].file_name, "image_0.png");
    }

    #[test]
    fn test_plan_page_images_textless_selection_uses_body() {
        let html = r#"<html><body>
            <p>Intro</p><img src="/banner.png">
            <main><img src="/inside.png"></main>
        </body></html>"#;
        let url = Url::parse("https://example.com/").unwrap();
        let plan = plan_page_images(html, &url, Some("main"));
        let srcs: Vec<&str> = plan.iter().map(|r| r.src.as_str()).collect();
        assert_eq!(srcs, vec!["/banner.png", "/inside.png"]);
    }

    #[test]
    fn test_plan_page_images_skips_page_chrome() {
        let html = r#"<html><body>
            <header><img src="/logo.png"></header>
            <nav><img src="/menu.png"></nav>
            <p>Body</p><img src="/photo.png">
            <div class="sidebar"><p>Ads</p><img src="/ad.png"></div>
        </body></html>"#;
        let url = Url::parse("https://example.com/").unwrap();
        let plan = plan_page_images(html, &url, None);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].src, "/photo.png");
        assert_eq!(plan[0].file_name, "image_0.png");
    }
}
