//! Fetch backends and the rate-limited fetch executor
//!
//! This module handles:
//! - The [`PageFetcher`] seam between the crawl core and a rendering backend
//! - A reqwest-based backend that presents itself as the configured browser
//! - Bounding concurrent fetches and pacing them with a jittered delay
//! - Error classification into [`FetchError`]

use crate::config::{BrowserType, CrawlConfig, CrawlerSettings};
use crate::crawler::scheduler::CrawlTask;
use crate::crawler::session::SessionCredential;
use crate::FetchError;
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully loaded document returned by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value; empty when the backend did not report one
    pub content_type: String,

    /// Rendered markup
    pub html: String,
}

/// Result of a single fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(FetchedDocument),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Everything a backend needs to load one page
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a Url,
    pub headless: bool,
    pub session: Option<&'a SessionCredential>,
}

/// A backend able to load and render a page
///
/// Implementations must never panic on a bad page; every failure is
/// reported as [`FetchOutcome::Failure`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest<'_>) -> FetchOutcome;
}

/// Plain HTTP backend
///
/// Sends the configured browser's User-Agent and any session cookies that
/// cover the request URL. There is no script execution, so `headless` has
/// no effect beyond logging.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the backend
    ///
    /// # Arguments
    ///
    /// * `browser` - Browser whose User-Agent is presented
    /// * `timeout` - Total per-request timeout
    pub fn new(browser: BrowserType, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(browser.user_agent())
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Builds the backend from process settings
    pub fn from_settings(settings: &CrawlerSettings) -> Result<Self, reqwest::Error> {
        Self::new(
            settings.browser_type,
            Duration::from_secs_f64(settings.request_timeout),
        )
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest<'_>) -> FetchOutcome {
        tracing::trace!("GET {} (headless: {})", request.url, request.headless);

        let mut builder = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8");

        if let Some(cookies) = request.session.and_then(|s| s.cookie_header(request.url)) {
            builder = builder.header(COOKIE, cookies);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failure(classify_error(&e)),
        };

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return FetchOutcome::Failure(FetchError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match response.text().await {
            Ok(html) => FetchOutcome::Success(FetchedDocument {
                final_url,
                status_code: status.as_u16(),
                content_type,
                html,
            }),
            Err(e) if e.is_timeout() => FetchOutcome::Failure(FetchError::Timeout),
            Err(e) => FetchOutcome::Failure(FetchError::Body(e.to_string())),
        }
    }
}

fn classify_error(error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Network(format!("Connection failed: {}", error))
    } else if error.is_redirect() {
        FetchError::Network(format!("Redirect error: {}", error))
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Jittered politeness delay
///
/// Each sample is `mean * (1 + u)` with `u` uniform in
/// `[-jitter, +jitter]`, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPolicy {
    mean: f64,
    jitter: f64,
}

impl DelayPolicy {
    pub fn new(mean: f64, jitter: f64) -> Self {
        Self {
            mean: mean.max(0.0),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.mean <= 0.0 {
            return Duration::ZERO;
        }

        let offset = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };

        Duration::from_secs_f64((self.mean * (1.0 + offset)).max(0.0))
    }
}

/// Runs fetches through a backend with bounded concurrency and pacing
///
/// Every fetch first sleeps for a sampled delay, then waits for one of
/// `concurrency` permits. A successful load is followed by the settle wait
/// while the permit is still held.
///
/// The coordinator runs exactly `concurrency` workers with one fetch each,
/// so inside a run the permits never block; they bound callers that share
/// one executor across more tasks.
pub struct FetchExecutor {
    fetcher: Arc<dyn PageFetcher>,
    permits: Semaphore,
    delay: DelayPolicy,
    settle_time: Duration,
    headless: bool,
    session: Option<SessionCredential>,
}

impl FetchExecutor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            permits: Semaphore::new(config.concurrency.max(1)),
            delay: DelayPolicy::new(config.mean_delay, config.jitter_fraction),
            settle_time: Duration::from_secs_f64(config.settle_time.max(0.0)),
            headless: config.headless,
            session: config.session_credential.clone(),
        }
    }

    /// Fetches the task's URL
    ///
    /// Never fails as a whole; backend problems come back as
    /// [`FetchOutcome::Failure`]. Returns `None` without touching the backend
    /// when `stop` fires before the request is sent.
    pub async fn fetch(
        &self,
        task: &CrawlTask,
        stop: &CancellationToken,
    ) -> Option<FetchOutcome> {
        let delay = self.delay.sample(&mut rand::thread_rng());
        if !delay.is_zero() {
            tracing::trace!("Waiting {:?} before {}", delay, task.url);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop.cancelled() => return None,
            }
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return Some(FetchOutcome::Failure(FetchError::Render(
                    "fetch executor closed".to_string(),
                )))
            }
        };

        if stop.is_cancelled() {
            return None;
        }

        let request = FetchRequest {
            url: &task.url,
            headless: self.headless,
            session: self.session.as_ref(),
        };

        let outcome = self.fetcher.fetch(request).await;

        if outcome.is_success() && !self.settle_time.is_zero() {
            tokio::time::sleep(self.settle_time).await;
        }

        Some(outcome)
    }

    /// Permits currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
