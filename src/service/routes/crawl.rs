//! Crawl endpoint: POST /crawl
//!
//! Translates a JSON request into a [`CrawlConfig`] using the process
//! settings for anything the request leaves out, runs the crawl to
//! completion, and returns the records.

use crate::config::CrawlConfig;
use crate::crawler::{run_crawl_with_cancel, PageRecord};
use crate::output::{CrawlReport, CrawlStats, CrawlStatus};
use crate::service::error::{AppError, Result};
use crate::service::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use url::Url;

fn default_max_depth() -> u32 {
    1
}

/// Body of `POST /crawl`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlRequest {
    /// Absolute seed URL
    pub url: String,

    /// Defaults to the configured `default-headless`
    #[serde(default)]
    pub headless: Option<bool>,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Mean delay in seconds; defaults to the configured `default-delay`
    #[serde(default)]
    pub delay: Option<f64>,

    /// Overrides the configured scorer keywords
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    /// Overrides the configured page limit
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headless: None,
            max_depth: default_max_depth(),
            delay: None,
            keywords: None,
            max_pages: None,
        }
    }

    /// Builds the run configuration for this request
    pub fn to_config(&self, state: &AppState) -> CrawlConfig {
        let defaults = &state.settings.crawler;

        let mut config = CrawlConfig::from_settings(defaults, self.url.clone())
            .with_max_depth(self.max_depth)
            .with_headless(self.headless.unwrap_or(defaults.default_headless))
            .with_delay(
                self.delay.unwrap_or(defaults.default_delay),
                defaults.jitter_fraction,
            )
            .with_session_credential(state.session.clone());

        if let Some(keywords) = &self.keywords {
            config = config.with_keywords(keywords.clone());
        }
        if self.max_pages.is_some() {
            config = config.with_max_pages(self.max_pages);
        }

        config
    }
}

/// Body of a successful `POST /crawl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<PageRecord>,
    pub total_pages: usize,
    pub stats: CrawlStats,
}

impl From<CrawlReport> for CrawlResponse {
    fn from(report: CrawlReport) -> Self {
        let total_pages = report.records.len();
        let message = match report.stats.status {
            CrawlStatus::Completed => format!("Successfully crawled {} pages", total_pages),
            CrawlStatus::Cancelled => format!("Crawl cancelled after {} pages", total_pages),
        };

        Self {
            success: true,
            message,
            data: report.records,
            total_pages,
            stats: report.stats,
        }
    }
}

/// POST /crawl - Run a crawl and return its records
pub async fn crawl(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Json<CrawlResponse>> {
    let Json(request) = payload?;
    Url::parse(&request.url)
        .map_err(|e| AppError::InvalidRequest(format!("url '{}': {}", request.url, e)))?;

    tracing::info!(
        "Crawl requested for {} (max depth {})",
        request.url,
        request.max_depth
    );

    let config = request.to_config(&state);
    let report = run_crawl_with_cancel(config, state.fetcher.clone(), state.shutdown.child_token())
        .await
        .map_err(|e| AppError::CrawlFailed(e.to_string()))?;

    Ok(Json(CrawlResponse::from(report)))
}
