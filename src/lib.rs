//! Solv Crawler: a best-first deep crawler behind a small HTTP API
//!
//! This crate fetches pages starting from a seed URL, follows internal links
//! ordered by keyword relevance, and returns structured per-page records
//! (URL, depth, metadata, internal/external links) to its caller.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod output;
pub mod service;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Task-local failures never surface here; they are absorbed by the
/// coordinator and summarized in [`output::CrawlStats`].
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid session credential: {0}")]
    Credential(String),
}

/// Reasons a single fetch can fail
///
/// These are carried inside [`crawler::FetchOutcome::Failure`] and only ever
/// cost the crawl one task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Errors raised while turning a fetched document into a page record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Cannot extract links for non-HTTP URL: {0}")]
    UnsupportedScheme(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, Settings};
pub use crawler::{run_crawl, Coordinator, FetchOutcome, PageFetcher, PageRecord};
pub use output::{CrawlReport, CrawlStats, CrawlStatus};
pub use state::RunState;
pub use crate::url::{extract_domain, normalize_url, registrable_domain};
