use crate::filter::UrlFilter;
use crate::url::compile_pattern;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Accepts URLs by glob/regex allow and deny lists
///
/// A URL matching any deny pattern is rejected. When allow patterns are
/// configured, a URL must match at least one of them.
#[derive(Debug, Clone)]
pub struct UrlPatternFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl UrlPatternFilter {
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            allow: compile_all(allow)?,
            deny: compile_all(deny)?,
        })
    }

    /// True when neither list has entries, so the filter accepts everything
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            compile_pattern(p)
                .map_err(|e| ConfigError::InvalidPattern(format!("URL pattern '{}': {}", p, e)))
        })
        .collect()
}

impl UrlFilter for UrlPatternFilter {
    fn name(&self) -> &'static str {
        "url_pattern"
    }

    fn accept(&self, url: &Url, _source_depth: u32) -> bool {
        let candidate = url.as_str();

        if self.deny.iter().any(|re| re.is_match(candidate)) {
            return false;
        }

        self.allow.is_empty() || self.allow.iter().any(|re| re.is_match(candidate))
    }
}
