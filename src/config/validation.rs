use crate::config::types::{CrawlConfig, CrawlerSettings, ServerSettings, Settings};
use crate::url::compile_pattern;
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent fetch workers
const MAX_CONCURRENCY: usize = 64;

/// Validates the process settings
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_server_settings(&settings.server)?;
    validate_crawler_settings(&settings.crawler)?;
    Ok(())
}

fn validate_server_settings(settings: &ServerSettings) -> Result<(), ConfigError> {
    if settings.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.host cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_crawler_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    validate_concurrency(settings.concurrency)?;
    validate_seconds("default_delay", settings.default_delay)?;
    validate_jitter(settings.jitter_fraction)?;
    validate_seconds("settle_time", settings.settle_time)?;

    if !settings.request_timeout.is_finite() || settings.request_timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be > 0 seconds, got {}",
            settings.request_timeout
        )));
    }

    validate_filters(
        &settings.url_allow_patterns,
        &settings.url_deny_patterns,
        &settings.allowed_domains,
        &settings.blocked_domains,
        &settings.content_types,
    )?;
    validate_max_pages(settings.max_pages)?;
    Ok(())
}

/// Validates a crawl run configuration and returns the parsed seed URL
///
/// Runs before any network activity; a failure here is the only way a run
/// ends in the `Failed` state.
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<Url, ConfigError> {
    let seed = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )));
    }

    if seed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            config.seed_url
        )));
    }

    validate_concurrency(config.concurrency)?;
    validate_seconds("mean_delay", config.mean_delay)?;
    validate_jitter(config.jitter_fraction)?;
    validate_seconds("settle_time", config.settle_time)?;
    validate_filters(
        &config.url_allow_patterns,
        &config.url_deny_patterns,
        &config.allowed_domains,
        &config.blocked_domains,
        &config.content_types,
    )?;
    validate_max_pages(config.max_pages)?;

    Ok(seed)
}

fn validate_concurrency(concurrency: usize) -> Result<(), ConfigError> {
    if concurrency < 1 || concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, concurrency
        )));
    }
    Ok(())
}

fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_jitter(jitter: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&jitter) {
        return Err(ConfigError::Validation(format!(
            "jitter_fraction must be within [0, 1], got {}",
            jitter
        )));
    }
    Ok(())
}

fn validate_max_pages(max_pages: Option<usize>) -> Result<(), ConfigError> {
    if max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }
    Ok(())
}

fn validate_filters(
    allow_patterns: &[String],
    deny_patterns: &[String],
    allowed_domains: &[String],
    blocked_domains: &[String],
    content_types: &[String],
) -> Result<(), ConfigError> {
    for pattern in allow_patterns.iter().chain(deny_patterns) {
        compile_pattern(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("URL pattern '{}': {}", pattern, e))
        })?;
    }

    for domain in allowed_domains.iter().chain(blocked_domains) {
        validate_domain_pattern(domain)?;
    }

    if content_types.is_empty() {
        return Err(ConfigError::Validation(
            "content_types must list at least one type".to_string(),
        ));
    }

    for content_type in content_types {
        if !content_type.contains('/') {
            return Err(ConfigError::Validation(format!(
                "Content type '{}' must look like 'type/subtype'",
                content_type
            )));
        }
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
