use crate::filter::UrlFilter;
use crate::url::{extract_domain, matches_wildcard};
use url::Url;

/// Accepts URLs whose host is in the allow-set and not in the block-set
///
/// Host matching is exact unless the pattern carries a `*.` wildcard, in
/// which case the bare domain and all of its subdomains match. The block-set
/// is checked first.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
}

impl DomainFilter {
    pub fn new(allowed: Vec<String>, blocked: Vec<String>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|d| d.to_lowercase()).collect(),
            blocked: blocked.into_iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    /// Restricts crawling to exactly the seed's host
    pub fn same_host(seed: &Url, blocked: Vec<String>) -> Self {
        let allowed = extract_domain(seed).into_iter().collect();
        Self::new(allowed, blocked)
    }
}

impl UrlFilter for DomainFilter {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn accept(&self, url: &Url, _source_depth: u32) -> bool {
        let Some(host) = extract_domain(url) else {
            return false;
        };

        if self.blocked.iter().any(|p| matches_wildcard(p, &host)) {
            return false;
        }

        self.allowed.is_empty() || self.allowed.iter().any(|p| matches_wildcard(p, &host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_is_exact() {
        let filter = DomainFilter::same_host(&url("https://medium.com/@author"), vec![]);
        assert!(filter.accept(&url("https://medium.com/p/1"), 0));
        assert!(!filter.accept(&url("https://help.medium.com/"), 0));
        assert!(!filter.accept(&url("https://twitter.com/x"), 0));
    }

    #[test]
    fn test_wildcard_allows_subdomains() {
        let filter = DomainFilter::new(vec!["*.example.com".to_string()], vec![]);
        assert!(filter.accept(&url("https://example.com/"), 0));
        assert!(filter.accept(&url("https://docs.example.com/"), 0));
        assert!(!filter.accept(&url("https://example.org/"), 0));
    }

    #[test]
    fn test_blocked_overrides_allowed() {
        let filter = DomainFilter::new(
            vec!["*.example.com".to_string()],
            vec!["ads.example.com".to_string()],
        );
        assert!(!filter.accept(&url("https://ads.example.com/banner"), 0));
        assert!(filter.accept(&url("https://www.example.com/"), 0));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let filter = DomainFilter::new(vec!["Example.COM".to_string()], vec![]);
        assert!(filter.accept(&url("https://EXAMPLE.com/"), 0));
    }

    #[test]
    fn test_empty_allow_list_accepts_any_unblocked() {
        let filter = DomainFilter::new(vec![], vec!["spam.test".to_string()]);
        assert!(filter.accept(&url("https://anything.test/"), 0));
        assert!(!filter.accept(&url("https://spam.test/"), 0));
    }
}
