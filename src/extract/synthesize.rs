//! Document synthesis
//!
//! Walks a content root depth-first and turns it into a flat block list.
//! Every walk function returns the blocks for its own subtree; callers
//! concatenate them and decide on spacing around containers.

use crate::document::{Block, Inline, StructuredDocument};
use crate::extract::content::ContentRoot;
use crate::extract::heuristics::LayoutRules;
use crate::extract::images::ImageMap;
use crate::extract::layout::optimize_layout;
use scraper::{ElementRef, Node};
use std::collections::HashSet;
use url::Url;

/// Tags walked as containers
const CONTAINER_TAGS: &[&str] = &["div", "section", "article", "main", "ul", "ol"];

/// Tags flattened into inline runs
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "del", "em", "font", "i", "ins", "kbd", "label", "mark",
    "q", "s", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Tags collected by the secondary fallback pass
const FALLBACK_PARAGRAPH_TAGS: &[&str] = &["p", "td", "th", "blockquote"];

/// Inputs shared by a whole synthesis run
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'r> {
    /// Page URL, used to absolutize links
    pub base_url: &'r Url,
    pub include_images: bool,
    /// Images that were actually saved
    pub images: &'r ImageMap,
    pub rules: &'r LayoutRules,
}

/// Builds the structured document for a content root
///
/// The result is never empty when the root has visible text.
pub fn synthesize(root: &ContentRoot<'_>, ctx: &SynthesisContext<'_>) -> StructuredDocument {
    let walker = Walker { root, ctx };
    let rules = ctx.rules;

    let mut blocks = walker.walk_children(root.element, true);

    let text = root.text();
    let content = count_content(&blocks);
    if content < rules.min_content_blocks && text.chars().count() > rules.fallback_text_threshold {
        tracing::debug!(
            "Only {} content blocks for {} chars of text, trying fallback passes",
            content,
            text.chars().count()
        );
        blocks = pick_fallback(blocks, &walker, rules.min_content_blocks);
    }

    if count_content(&blocks) == 0 && !text.is_empty() {
        blocks = vec![Block::paragraph(text)];
    }

    StructuredDocument::new(optimize_layout(blocks, rules))
}

fn count_content(blocks: &[Block]) -> usize {
    blocks.iter().filter(|b| b.is_content()).count()
}

/// First candidate that clears the threshold, else the richest one
fn pick_fallback(primary: Vec<Block>, walker: &Walker<'_, '_>, min_content: usize) -> Vec<Block> {
    let mut best = primary;
    let mut best_count = count_content(&best);

    let secondary = walker.rescan(walker.root.element);
    let secondary_count = count_content(&secondary);
    if secondary_count >= min_content {
        return secondary;
    }
    if secondary_count > best_count {
        best = secondary;
        best_count = secondary_count;
    }

    // Plain paragraphs lose links and emphasis, so only take them when they cover more
    let split = split_text_blocks(&walker.root.block_text());
    if count_content(&split) > best_count {
        return split;
    }
    best
}

/// Splits text on blank lines into plain paragraphs, dropping repeats
fn split_text_blocks(text: &str) -> Vec<Block> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();
    let mut chunk = String::new();

    let mut flush = |chunk: &mut String| {
        let collapsed = collapse_whitespace(chunk).trim().to_string();
        chunk.clear();
        if !collapsed.is_empty() && seen.insert(collapsed.to_lowercase()) {
            blocks.push(Block::paragraph(collapsed));
        }
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut chunk);
        } else {
            chunk.push_str(line);
            chunk.push(' ');
        }
    }
    flush(&mut chunk);

    blocks
}

/// Collapses whitespace runs to one space, keeping a single edge space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trims run edges, drops the double spaces collapsing leaves behind and
/// merges neighbouring runs with the same formatting
fn finish_runs(runs: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(runs.len());

    for mut run in runs {
        let after_space = out.last().map_or(true, |prev| prev.text().ends_with(' '));
        if after_space {
            let trimmed = run.text().trim_start().to_string();
            *run.text_mut() = trimmed;
        }
        if run.text().is_empty() {
            continue;
        }
        if let (
            Some(Inline::Text {
                text: prev_text,
                bold: prev_bold,
                italic: prev_italic,
            }),
            Inline::Text { text, bold, italic },
        ) = (out.last_mut(), &run)
        {
            if *prev_bold == *bold && *prev_italic == *italic {
                prev_text.push_str(text);
                continue;
            }
        }
        out.push(run);
    }

    while let Some(last) = out.last_mut() {
        let trimmed = last.text().trim_end().to_string();
        if trimmed.is_empty() {
            out.pop();
        } else {
            *last.text_mut() = trimmed;
            break;
        }
    }

    out
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn class_and_id(element: &ElementRef<'_>) -> String {
    let value = element.value();
    format!(
        "{} {}",
        value.attr("class").unwrap_or(""),
        value.attr("id").unwrap_or("")
    )
}

struct Walker<'a, 'r> {
    root: &'a ContentRoot<'a>,
    ctx: &'a SynthesisContext<'r>,
}

impl<'a, 'r> Walker<'a, 'r> {
    /// Blocks for the children of `element`
    ///
    /// Consecutive text and inline elements are gathered into one paragraph.
    fn walk_children(&self, element: ElementRef<'_>, top_level: bool) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending: Vec<Inline> = Vec::new();
        let mut seen_outer_container = false;

        for child in element.children() {
            if let Node::Text(text) = child.value() {
                pending.push(Inline::plain(collapse_whitespace(text)));
                continue;
            }

            let Some(child_element) = ElementRef::wrap(child) else {
                continue;
            };
            if !self.root.includes(&child_element) {
                continue;
            }

            let name = child_element.value().name();
            if INLINE_TAGS.contains(&name) && !self.has_block_descendant(child_element) {
                pending.extend(self.element_runs(child_element, false, false));
                continue;
            }

            flush_paragraph(&mut pending, &mut blocks);

            if let Some(level) = heading_level(name) {
                blocks.extend(self.heading(child_element, level));
            } else if CONTAINER_TAGS.contains(&name) {
                let container = self.container(
                    child_element,
                    top_level,
                    seen_outer_container,
                    blocks.len(),
                );
                if top_level && matches!(name, "div" | "section") {
                    seen_outer_container = true;
                }
                blocks.extend(container);
            } else {
                match name {
                    "p" => blocks.extend(self.paragraph(child_element)),
                    "li" => blocks.extend(self.list_item(child_element)),
                    "br" => blocks.push(Block::Spacer),
                    "img" => blocks.extend(self.image(child_element)),
                    _ => blocks.extend(self.walk_children(child_element, false)),
                }
            }
        }

        flush_paragraph(&mut pending, &mut blocks);
        blocks
    }

    fn heading(&self, element: ElementRef<'_>, level: u8) -> Option<Block> {
        let runs = finish_runs(self.inline_runs(element, false, false));
        if runs.is_empty() {
            return None;
        }
        let text: String = runs.iter().map(Inline::text).collect();
        Some(Block::Heading {
            level,
            emphasized: self.ctx.rules.is_emphasized_heading(&text),
            runs,
        })
    }

    fn paragraph(&self, element: ElementRef<'_>) -> Option<Block> {
        let runs = finish_runs(self.inline_runs(element, false, false));
        if !runs.is_empty() {
            return Some(Block::Paragraph(runs));
        }
        let text = self.root.element_text(element);
        (!text.is_empty()).then(|| Block::paragraph(text))
    }

    /// The item's own text, then any nested lists as blocks of their own
    fn list_item(&self, element: ElementRef<'_>) -> Vec<Block> {
        let mut runs = Vec::new();
        let mut nested = Vec::new();

        for child in element.children() {
            if let Node::Text(text) = child.value() {
                runs.push(Inline::plain(collapse_whitespace(text)));
                continue;
            }
            let Some(child_element) = ElementRef::wrap(child) else {
                continue;
            };
            if !self.root.includes(&child_element) {
                continue;
            }
            match child_element.value().name() {
                "ul" | "ol" => nested.extend(self.walk_children(child_element, false)),
                _ => runs.extend(self.element_runs(child_element, false, false)),
            }
        }

        let runs = finish_runs(runs);
        let mut blocks = Vec::with_capacity(nested.len() + 1);
        if !runs.is_empty() {
            blocks.push(Block::ListItem(runs));
        }
        blocks.extend(nested);
        blocks
    }

    fn container(
        &self,
        element: ElementRef<'_>,
        top_level: bool,
        after_outer_container: bool,
        preceding_blocks: usize,
    ) -> Vec<Block> {
        let rules = self.ctx.rules;
        let text = self.root.element_text(element);
        let has_children = element.children().any(|c| c.value().is_element());
        if text.is_empty() && !has_children {
            return Vec::new();
        }

        let hints = class_and_id(&element);
        let is_column = rules.is_column(&hints);
        let is_full_width = rules.is_full_width(&hints);
        let outermost = top_level && matches!(element.value().name(), "div" | "section");

        let mut blocks = Vec::new();
        if outermost && after_outer_container {
            blocks.push(Block::Spacer);
        }

        if top_level
            && is_column
            && after_outer_container
            && text.chars().count() > rules.column_text_threshold
            && preceding_blocks + blocks.len() > rules.column_min_preceding_blocks
        {
            blocks.push(Block::PageBreak);
        }

        let inner = self.walk_children(element, false);
        let added = inner.len();

        if added == 0 && !text.is_empty() {
            blocks.push(Block::paragraph(text));
        } else {
            blocks.extend(inner);
        }

        if is_full_width && added > 5 {
            blocks.push(Block::Spacer);
            blocks.push(Block::Spacer);
        }
        if is_column && added > 0 {
            blocks.push(Block::Spacer);
        }

        blocks
    }

    fn image(&self, element: ElementRef<'_>) -> Option<Block> {
        if !self.ctx.include_images {
            return None;
        }
        let src = element.value().attr("src")?;
        let file_name = self.ctx.images.get(src)?;
        Some(Block::Image {
            alt: image_alt(&element),
            file_name: file_name.clone(),
        })
    }

    fn image_run(&self, element: ElementRef<'_>) -> Option<Inline> {
        self.image(element)
            .map(|block| Inline::italic(format!(" {} ", block.text())))
    }

    /// Flattens the children of `element` into runs, carrying bold/italic downward
    fn inline_runs(&self, element: ElementRef<'_>, bold: bool, italic: bool) -> Vec<Inline> {
        let mut runs = Vec::new();

        for child in element.children() {
            if let Node::Text(text) = child.value() {
                runs.push(Inline::Text {
                    text: collapse_whitespace(text),
                    bold,
                    italic,
                });
            } else if let Some(child_element) = ElementRef::wrap(child) {
                if self.root.includes(&child_element) {
                    runs.extend(self.element_runs(child_element, bold, italic));
                }
            }
        }

        runs
    }

    /// Runs for one inline element, applying its own formatting
    fn element_runs(&self, element: ElementRef<'_>, bold: bool, italic: bool) -> Vec<Inline> {
        match element.value().name() {
            "a" => self.link_runs(element, bold, italic),
            "strong" | "b" => self.inline_runs(element, true, italic),
            "em" | "i" => self.inline_runs(element, bold, true),
            "br" => vec![Inline::plain(" ")],
            "img" => self.image_run(element).into_iter().collect(),
            _ => self.inline_runs(element, bold, italic),
        }
    }

    fn link_runs(&self, element: ElementRef<'_>, bold: bool, italic: bool) -> Vec<Inline> {
        let text = collapse_whitespace(&element.text().collect::<String>());
        let href = element
            .value()
            .attr("href")
            .and_then(|href| self.ctx.base_url.join(href.trim()).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https" | "mailto" | "tel"));

        match href {
            Some(url) if !text.trim().is_empty() => vec![Inline::link(text, url.to_string())],
            _ => self.inline_runs(element, bold, italic),
        }
    }

    fn has_block_descendant(&self, element: ElementRef<'_>) -> bool {
        element.descendants().skip(1).any(|node| {
            ElementRef::wrap(node).is_some_and(|e| {
                let name = e.value().name();
                heading_level(name).is_some()
                    || CONTAINER_TAGS.contains(&name)
                    || matches!(name, "p" | "li" | "table" | "blockquote")
            })
        })
    }

    /// Secondary pass: text of paragraph-like tags anywhere under `element`
    fn rescan(&self, element: ElementRef<'_>) -> Vec<Block> {
        let mut blocks = Vec::new();

        for child in element.children().filter_map(ElementRef::wrap) {
            if !self.root.includes(&child) {
                continue;
            }
            let name = child.value().name();
            let text = || self.root.element_text(child);

            if let Some(level) = heading_level(name) {
                let text = text();
                if !text.is_empty() {
                    blocks.push(Block::Heading {
                        level,
                        emphasized: self.ctx.rules.is_emphasized_heading(&text),
                        runs: vec![Inline::plain(text)],
                    });
                }
            } else if name == "li" {
                let text = text();
                if !text.is_empty() {
                    blocks.push(Block::ListItem(vec![Inline::plain(text)]));
                }
            } else if FALLBACK_PARAGRAPH_TAGS.contains(&name) {
                let text = text();
                if !text.is_empty() {
                    blocks.push(Block::paragraph(text));
                }
            } else {
                blocks.extend(self.rescan(child));
            }
        }

        blocks
    }
}

fn image_alt(element: &ElementRef<'_>) -> String {
    element
        .value()
        .attr("alt")
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .unwrap_or("Image")
        .to_string()
}

fn flush_paragraph(pending: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    if pending.is_empty() {
        return;
    }
    let runs = finish_runs(std::mem::take(pending));
    if !runs.is_empty() {
        blocks.push(Block::Paragraph(runs));
    }
}
