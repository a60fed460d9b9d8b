use crate::config::types::{Config, CrawlerConfig, FetchConfig, LayoutConfig, OutputConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_layout_config(&config.layout)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max_urls must be >= 1, got {}",
            config.max_urls
        )));
    }

    if config.max_crawl_time < 1 {
        return Err(ConfigError::Validation(format!(
            "max_crawl_time must be >= 1s, got {}s",
            config.max_crawl_time
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.render_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "render_timeout must be >= 1s, got {}s",
            config.render_timeout
        )));
    }

    if let Some(webdriver_url) = &config.webdriver_url {
        Url::parse(webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.storage_dir.is_empty() {
        return Err(ConfigError::Validation(
            "storage_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates layout heuristics
fn validate_layout_config(config: &LayoutConfig) -> Result<(), ConfigError> {
    if config.page_break_run < 1 {
        return Err(ConfigError::Validation(
            "page_break_run must be >= 1".to_string(),
        ));
    }

    validate_pattern("column_pattern", &config.column_pattern)?;
    validate_pattern("full_width_pattern", &config.full_width_pattern)?;

    Ok(())
}

fn validate_pattern(name: &str, pattern: &str) -> Result<(), ConfigError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("{} '{}': {}", name, pattern, e)))
}
