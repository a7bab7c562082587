//! Crawler module for best-first deep crawling
//!
//! This module contains the core crawling logic, including:
//! - The priority frontier and its visited set
//! - Keyword relevance scoring
//! - Rate-limited fetching through a pluggable backend
//! - Metadata and link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod scorer;
mod session;

pub use coordinator::{run_crawl, run_crawl_with_cancel, Coordinator};
pub use fetcher::{
    DelayPolicy, FetchExecutor, FetchOutcome, FetchRequest, FetchedDocument, HttpFetcher,
    PageFetcher,
};
pub use parser::{extract_page, DiscoveredLink, ExtractedPage, PageLinks, PageRecord};
pub use scheduler::{CrawlTask, Frontier, PushResult, TaskLease};
pub use scorer::{KeywordRelevanceScorer, UrlScorer};
pub use session::SessionCredential;
