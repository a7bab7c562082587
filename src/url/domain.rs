use url::{Host, Url};

/// Second-level labels that act as public suffixes under country-code TLDs
/// (e.g. `co.uk`, `com.au`)
const SECOND_LEVEL_SUFFIXES: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "or", "org"];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use solv_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the registrable domain of a URL, used to decide "same site"
///
/// IP addresses and single-label hosts are their own registrable domain.
/// Otherwise the last two labels are kept, or the last three when the host
/// sits under a known second-level suffix of a country-code TLD.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use solv_crawler::url::registrable_domain;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://news.bbc.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("bbc.co.uk".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
        Host::Domain(domain) => Some(registrable_part(&domain.to_lowercase())),
    }
}

fn registrable_part(host: &str) -> String {
    let host = host.trim_end_matches('.');
    let labels: Vec<&str> = host.split('.').collect();

    if labels.len() <= 2 {
        return host.to_string();
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second) {
        3
    } else {
        2
    };

    labels[labels.len() - keep..].join(".")
}

/// Returns true if both URLs belong to the same registrable domain
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (registrable_domain(a), registrable_domain(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
