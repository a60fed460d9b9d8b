use serde::Deserialize;

/// Main configuration structure for Site-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Config {
    /// Builds a configuration with default crawler, fetch and layout sections
    pub fn with_output(database_path: impl Into<String>, storage_dir: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputConfig {
                database_path: database_path.into(),
                storage_dir: storage_dir.into(),
            },
            layout: LayoutConfig::default(),
        }
    }
}

/// Crawl bounds and politeness settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of URLs to visit in one crawl
    pub max_urls: usize,

    /// Wall-clock ceiling for a crawl (seconds)
    pub max_crawl_time: u64,

    /// Fixed delay between fetch attempts (milliseconds)
    pub request_delay: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_urls: 1000,
            max_crawl_time: 30 * 60,
            request_delay: 500,
        }
    }
}

/// HTTP client and renderer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Network fetch timeout (seconds)
    pub timeout: u64,

    /// Full-page render timeout (seconds)
    pub render_timeout: u64,

    /// Wait after navigation before reading the DOM (milliseconds)
    pub settle_delay: u64,

    /// WebDriver endpoint; when set, documents are generated from the rendered DOM
    pub webdriver_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; SiteScribe/0.1; +https://github.com/site-scribe)"
                .to_string(),
            timeout: 10,
            render_timeout: 30,
            settle_delay: 2000,
            webdriver_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Root directory under which each job gets its own folder
    pub storage_dir: String,
}

/// Layout heuristics for the document synthesizer
///
/// These are guesses tuned on a handful of sites, so every knob is exposed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutConfig {
    /// Below this many content blocks the fallback passes kick in
    pub min_content_blocks: usize,

    /// Minimum root text length (chars) for the fallback passes to run
    pub fallback_text_threshold: usize,

    /// Content blocks between forced page breaks
    pub page_break_run: usize,

    /// Longest allowed run of spacing blocks
    pub max_consecutive_spacers: usize,

    /// Text length (chars) above which a column container earns a page break
    pub column_text_threshold: usize,

    /// Blocks that must precede a column page break
    pub column_min_preceding_blocks: usize,

    /// Regex matched against `class` + `id` to detect column containers
    pub column_pattern: String,

    /// Regex matched against `class` + `id` to detect full-width containers
    pub full_width_pattern: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_content_blocks: 5,
            fallback_text_threshold: 100,
            page_break_run: 28,
            max_consecutive_spacers: 2,
            column_text_threshold: 500,
            column_min_preceding_blocks: 10,
            column_pattern: "col|column|left|right|sidebar".to_string(),
            full_width_pattern: "full|wide|container|wrapper|main-content".to_string(),
        }
    }
}
