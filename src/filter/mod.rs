//! Filter chain deciding whether a discovered URL may be visited
//!
//! The chain is a fixed-order AND of independent predicates:
//! URL pattern, then domain, then content type guessed from the URL. The
//! first rejection short-circuits. The declared content type of a fetched
//! response is checked separately through
//! [`FilterChain::accept_content_type`].
//!
//! Every predicate is a pure function of its input and static configuration.

mod content_type;
mod domain;
mod url_pattern;

pub use content_type::ContentTypeFilter;
pub use domain::DomainFilter;
pub use url_pattern::UrlPatternFilter;

use crate::config::CrawlConfig;
use crate::ConfigError;
use url::Url;

/// A single admission predicate
pub trait UrlFilter: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Returns true if `url`, discovered on a page at `source_depth`, may be visited
    fn accept(&self, url: &Url, source_depth: u32) -> bool;
}

/// Ordered composition of [`UrlFilter`]s
pub struct FilterChain {
    filters: Vec<Box<dyn UrlFilter>>,
    content_type: ContentTypeFilter,
}

impl FilterChain {
    /// Creates an empty chain that accepts every URL and the given content types
    pub fn new(content_type: ContentTypeFilter) -> Self {
        Self {
            filters: Vec::new(),
            content_type,
        }
    }

    /// Appends a predicate; predicates run in insertion order
    pub fn with_filter(mut self, filter: impl UrlFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Builds the chain for a crawl run
    ///
    /// With no configured allowed domains the crawl is confined to the
    /// seed's host.
    pub fn from_config(config: &CrawlConfig, seed: &Url) -> Result<Self, ConfigError> {
        let url_pattern =
            UrlPatternFilter::new(&config.url_allow_patterns, &config.url_deny_patterns)?;

        let domain = if config.allowed_domains.is_empty() {
            DomainFilter::same_host(seed, config.blocked_domains.clone())
        } else {
            DomainFilter::new(
                config.allowed_domains.clone(),
                config.blocked_domains.clone(),
            )
        };

        let content_type = ContentTypeFilter::new(config.content_types.clone());

        Ok(Self::new(content_type.clone())
            .with_filter(url_pattern)
            .with_filter(domain)
            .with_filter(content_type))
    }

    /// Runs every predicate in order; any rejection rejects the URL
    pub fn accept(&self, url: &Url, source_depth: u32) -> bool {
        for filter in &self.filters {
            if !filter.accept(url, source_depth) {
                tracing::trace!("{} rejected by {} filter", url, filter.name());
                return false;
            }
        }
        true
    }

    /// Checks the declared content type of a fetched response
    pub fn accept_content_type(&self, content_type: &str) -> bool {
        self.content_type.accepts_content_type(content_type)
    }

    /// Number of URL predicates in the chain
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
