use crate::crawler::SessionCredential;
use serde::{Deserialize, Serialize};

/// Process-wide settings, loaded once at startup
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub crawler: CrawlerSettings,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Browser flavour the fetch backend should present itself as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    /// User-Agent string sent by the HTTP backend for this browser
    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Chromium => {
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            }
            Self::Firefox => {
                "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0"
            }
            Self::Webkit => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15"
            }
        }
    }
}

/// Crawler defaults applied to every run started through the service
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerSettings {
    /// Browser the fetch backend emulates
    pub browser_type: BrowserType,

    /// Path to the exported session (storage state) file; empty means none
    pub storage_state: String,

    /// Headless mode when a request does not specify one
    pub default_headless: bool,

    /// Mean inter-request delay in seconds when a request does not specify one
    pub default_delay: f64,

    /// Number of concurrent fetch workers
    pub concurrency: usize,

    /// Relative jitter applied around the mean delay, in [0, 1]
    pub jitter_fraction: f64,

    /// Fixed post-load wait in seconds before a document is considered ready
    pub settle_time: f64,

    /// Per-request timeout in seconds
    pub request_timeout: f64,

    /// Keywords used by the relevance scorer
    pub keywords: Vec<String>,

    /// Domains that may be crawled; empty means the seed host only
    pub allowed_domains: Vec<String>,

    /// Domains that are never crawled
    pub blocked_domains: Vec<String>,

    /// URL patterns a link must match (glob, or regex with a `re:` prefix)
    pub url_allow_patterns: Vec<String>,

    /// URL patterns that reject a link
    pub url_deny_patterns: Vec<String>,

    /// Accepted response content types
    pub content_types: Vec<String>,

    /// Record pages rejected by the content-type filter instead of dropping them
    pub record_filtered_content: bool,

    /// Enqueue external links as well as internal ones
    pub follow_external: bool,

    /// Upper bound on recorded pages per run
    pub max_pages: Option<usize>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chromium,
            storage_state: String::new(),
            default_headless: true,
            default_delay: 2.0,
            concurrency: 1,
            jitter_fraction: 0.5,
            settle_time: 5.0,
            request_timeout: 30.0,
            keywords: Vec::new(),
            allowed_domains: Vec::new(),
            blocked_domains: Vec::new(),
            url_allow_patterns: Vec::new(),
            url_deny_patterns: Vec::new(),
            content_types: default_content_types(),
            record_filtered_content: false,
            follow_external: false,
            max_pages: None,
        }
    }
}

/// Content types accepted when nothing else is configured
pub fn default_content_types() -> Vec<String> {
    vec![
        "text/html".to_string(),
        "text/plain".to_string(),
        "application/xhtml+xml".to_string(),
    ]
}

/// Configuration of a single crawl run
///
/// Built once per run and validated before any network activity; the
/// coordinator never mutates it.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Absolute URL the crawl starts from
    pub seed_url: String,

    /// Deepest level that may be fetched (the seed is depth 0)
    pub max_depth: u32,

    /// Number of concurrent fetch workers
    pub concurrency: usize,

    /// Mean delay before each fetch, in seconds
    pub mean_delay: f64,

    /// Relative jitter applied around the mean delay, in [0, 1]
    pub jitter_fraction: f64,

    /// Fixed post-load wait, in seconds
    pub settle_time: f64,

    /// Whether the fetch backend should run without a visible window
    pub headless: bool,

    /// Authentication material attached to every fetch
    pub session_credential: Option<SessionCredential>,

    pub url_allow_patterns: Vec<String>,
    pub url_deny_patterns: Vec<String>,
    pub allowed_domains: Vec<String>,
    pub blocked_domains: Vec<String>,
    pub content_types: Vec<String>,

    /// Keywords used by the relevance scorer
    pub keywords: Vec<String>,

    pub record_filtered_content: bool,
    pub follow_external: bool,
    pub max_pages: Option<usize>,
}

impl CrawlConfig {
    /// Creates a config for `seed_url` with the built-in defaults
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self::from_settings(&CrawlerSettings::default(), seed_url)
    }

    /// Creates a config for `seed_url` taking defaults from the process settings
    ///
    /// The session credential is not loaded here; callers attach it with
    /// [`CrawlConfig::with_session_credential`].
    pub fn from_settings(settings: &CrawlerSettings, seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: 1,
            concurrency: settings.concurrency,
            mean_delay: settings.default_delay,
            jitter_fraction: settings.jitter_fraction,
            settle_time: settings.settle_time,
            headless: settings.default_headless,
            session_credential: None,
            url_allow_patterns: settings.url_allow_patterns.clone(),
            url_deny_patterns: settings.url_deny_patterns.clone(),
            allowed_domains: settings.allowed_domains.clone(),
            blocked_domains: settings.blocked_domains.clone(),
            content_types: settings.content_types.clone(),
            keywords: settings.keywords.clone(),
            record_filtered_content: settings.record_filtered_content,
            follow_external: settings.follow_external,
            max_pages: settings.max_pages,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the mean delay and jitter fraction together
    pub fn with_delay(mut self, mean_delay: f64, jitter_fraction: f64) -> Self {
        self.mean_delay = mean_delay;
        self.jitter_fraction = jitter_fraction;
        self
    }

    pub fn with_settle_time(mut self, settle_time: f64) -> Self {
        self.settle_time = settle_time;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_session_credential(mut self, credential: Option<SessionCredential>) -> Self {
        self.session_credential = credential;
        self
    }
}
