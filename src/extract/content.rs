//! Content root resolution
//!
//! Picks the subtree a document is built from and decides which elements
//! inside it are page chrome rather than content.

use scraper::{ElementRef, Html, Node, Selector};

/// Tags that never carry readable content
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Page chrome removed from filtered roots
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Class tokens marking page chrome
const CHROME_CLASSES: &[&str] = &["nav", "navbar", "navigation", "header", "footer", "sidebar"];

/// The subtree a document is built from
#[derive(Debug, Clone, Copy)]
pub struct ContentRoot<'a> {
    pub element: ElementRef<'a>,
    /// Whether page chrome inside the root is skipped
    pub filtered: bool,
}

impl<'a> ContentRoot<'a> {
    /// Should the walk descend into `element`?
    pub fn includes(&self, element: &ElementRef<'_>) -> bool {
        let name = element.value().name();
        if NON_CONTENT_TAGS.contains(&name) {
            return false;
        }
        !(self.filtered && is_chrome(element))
    }

    /// Visible text of the root, whitespace collapsed
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(self.element, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Visible text of the root with block boundaries kept as blank lines
    pub fn block_text(&self) -> String {
        let mut raw = String::new();
        self.collect_block_text(self.element, &mut raw);
        raw
    }

    /// Visible text of any element under this root
    pub fn element_text(&self, element: ElementRef<'_>) -> String {
        let mut raw = String::new();
        self.collect_text(element, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Elements named `tag` that the walk would reach, in document order
    pub fn select_included(&self, tag: &str) -> Vec<ElementRef<'a>> {
        let mut found = Vec::new();
        self.collect_tagged(self.element, tag, &mut found);
        found
    }

    fn collect_tagged(&self, element: ElementRef<'a>, tag: &str, out: &mut Vec<ElementRef<'a>>) {
        for child in element.children() {
            let Some(child_element) = ElementRef::wrap(child) else {
                continue;
            };
            if !self.includes(&child_element) {
                continue;
            }
            if child_element.value().name() == tag {
                out.push(child_element);
            }
            self.collect_tagged(child_element, tag, out);
        }
    }

    fn collect_text(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                if self.includes(&child_element) {
                    self.collect_text(child_element, out);
                }
            } else if let Node::Text(text) = child.value() {
                out.push_str(text);
                out.push(' ');
            }
        }
    }

    fn collect_block_text(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                if !self.includes(&child_element) {
                    continue;
                }
                let block = is_block_tag(child_element.value().name());
                if block {
                    out.push_str("\n\n");
                }
                self.collect_block_text(child_element, out);
                if block {
                    out.push_str("\n\n");
                }
            } else if let Node::Text(text) = child.value() {
                out.push_str(text);
            }
        }
    }
}

/// Resolves the content root for a parsed page
///
/// A selector that parses and matches wins; anything else falls back to the
/// page body. If page-chrome filtering leaves no text, the unfiltered body
/// is used instead.
pub fn extract_content<'a>(document: &'a Html, selector: Option<&str>) -> ContentRoot<'a> {
    let selected = selector
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| match Selector::parse(s) {
            Ok(parsed) => document.select(&parsed).next(),
            Err(_) => {
                tracing::warn!("Ignoring invalid content selector '{}'", s);
                None
            }
        });

    if selector.is_some() && selected.is_none() {
        tracing::debug!("Content selector matched nothing, using page body");
    }

    let element = selected.unwrap_or_else(|| body_of(document));
    let filtered = ContentRoot {
        element,
        filtered: true,
    };

    if !filtered.text().is_empty() {
        return filtered;
    }

    ContentRoot {
        element: body_of(document),
        filtered: false,
    }
}

fn body_of(document: &Html) -> ElementRef<'_> {
    Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element())
}

fn is_chrome(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if CHROME_TAGS.contains(&value.name()) {
        return true;
    }
    if value.attr("role") == Some("navigation") {
        return true;
    }
    value
        .classes()
        .any(|class| CHROME_CLASSES.contains(&class.to_ascii_lowercase().as_str()))
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "main"
            | "ul"
            | "ol"
            | "li"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "br"
            | "table"
            | "tr"
            | "td"
            | "th"
            | "blockquote"
            | "pre"
    )
}
