//! Configuration module for the crawler service
//!
//! Two layers live here: process-wide [`Settings`] loaded once from TOML at
//! startup, and the per-run [`CrawlConfig`] built for every crawl and
//! validated before any network activity.
//!
//! # Example
//!
//! ```no_run
//! use solv_crawler::config::{load_settings, CrawlConfig};
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("solv-crawler.toml")).unwrap();
//! let config = CrawlConfig::from_settings(&settings.crawler, "https://example.com/")
//!     .with_max_depth(2);
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_content_types, BrowserType, CrawlConfig, CrawlerSettings, ServerSettings, Settings,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_settings, load_settings_with_hash, parse_settings};

pub use validation::{validate_crawl_config, validate_settings};
