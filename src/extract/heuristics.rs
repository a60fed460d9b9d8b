//! Layout and emphasis heuristics
//!
//! These are pattern-matched guesses, so they are plain functions over text and
//! attribute strings, parameterized by [`LayoutRules`].

use crate::config::LayoutConfig;
use crate::ConfigError;
use regex::Regex;

const GERUND_PATTERN: &str = r"^[A-Z][a-z]+ing\s+[A-Z][a-z]+";

/// Compiled layout policy
#[derive(Debug, Clone)]
pub struct LayoutRules {
    pub min_content_blocks: usize,
    pub fallback_text_threshold: usize,
    pub page_break_run: usize,
    pub max_consecutive_spacers: usize,
    pub column_text_threshold: usize,
    pub column_min_preceding_blocks: usize,
    pub column_pattern: Regex,
    pub full_width_pattern: Regex,
    /// Capitalized gerund followed by a capitalized word
    pub gerund_pattern: Regex,
}

impl LayoutRules {
    pub fn from_config(config: &LayoutConfig) -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        };

        Ok(Self {
            min_content_blocks: config.min_content_blocks,
            fallback_text_threshold: config.fallback_text_threshold,
            page_break_run: config.page_break_run.max(1),
            max_consecutive_spacers: config.max_consecutive_spacers,
            column_text_threshold: config.column_text_threshold,
            column_min_preceding_blocks: config.column_min_preceding_blocks,
            column_pattern: compile(&config.column_pattern)?,
            full_width_pattern: compile(&config.full_width_pattern)?,
            gerund_pattern: compile(GERUND_PATTERN)?,
        })
    }

    /// Does the `class`/`id` text hint at a multi-column layout?
    pub fn is_column(&self, class_and_id: &str) -> bool {
        self.column_pattern.is_match(&class_and_id.to_lowercase())
    }

    pub fn is_emphasized_heading(&self, text: &str) -> bool {
        is_emphasized_heading(text, &self.gerund_pattern)
    }

    /// Does the `class`/`id` text hint at a full-width band?
    pub fn is_full_width(&self, class_and_id: &str) -> bool {
        self.full_width_pattern.is_match(&class_and_id.to_lowercase())
    }
}

/// Should a heading with this text be rendered emphasized?
///
/// True for text that ends with a comma ("Measuring Care,"), starts with a
/// capitalized gerund followed by a capitalized word ("Enhancing Audits"),
/// or is a 2 to 4 word phrase where every word is capitalized.
pub fn is_emphasized_heading(text: &str, gerund_pattern: &Regex) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    if trimmed.ends_with(',') {
        return true;
    }

    if gerund_pattern.is_match(trimmed) {
        return true;
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}
