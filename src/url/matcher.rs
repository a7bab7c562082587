use regex::Regex;

/// Prefix marking a URL pattern as a raw regular expression
pub const REGEX_PREFIX: &str = "re:";

/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use solv_crawler::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "blog.example.com"));
/// assert!(matches_wildcard("*.example.com", "blog.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Compiles a URL pattern into a regular expression
///
/// Patterns prefixed with `re:` are used verbatim (unanchored). Anything
/// else is a glob matched against the whole URL, where `*` matches any run
/// of characters and `?` matches exactly one.
///
/// # Examples
///
/// ```
/// use solv_crawler::url::compile_pattern;
///
/// let glob = compile_pattern("*/blog/*").unwrap();
/// assert!(glob.is_match("https://example.com/blog/post-1"));
/// assert!(!glob.is_match("https://example.com/about"));
///
/// let re = compile_pattern(r"re:/p/\d+$").unwrap();
/// assert!(re.is_match("https://example.com/p/42"));
/// ```
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    match pattern.strip_prefix(REGEX_PREFIX) {
        Some(raw) => Regex::new(raw),
        None => Regex::new(&glob_to_regex(pattern)),
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}
