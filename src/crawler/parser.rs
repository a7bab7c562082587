//! Page extraction: metadata and classified links from a fetched document
//!
//! This module handles parsing HTML content to extract:
//! - Page title and `<meta>` metadata (description, keywords, author, Open Graph)
//! - The canonical URL
//! - Links from `<a>` tags, split into internal and external by registrable domain

use crate::crawler::fetcher::FetchedDocument;
use crate::url::{normalize_url, same_site};
use crate::ExtractionError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// `<meta name=...>` entries copied into the record
const META_NAMES: &[&str] = &["description", "keywords", "author"];

/// Structured result for one fetched page
///
/// Immutable once appended to a crawl's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub depth: u32,
    pub metadata: BTreeMap<String, Value>,
    pub links: PageLinks,
}

/// Outgoing links of a page, normalized and deduplicated in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

impl PageRecord {
    /// A record carrying only bookkeeping metadata and no links
    pub fn bare(url: &Url, depth: u32) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("depth".to_string(), Value::from(depth));

        Self {
            url: url.to_string(),
            depth,
            metadata,
            links: PageLinks::default(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// A link found on a page, ready for filtering and scoring
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredLink {
    pub url: Url,
    /// Anchor text of the first `<a>` pointing at this URL
    pub anchor_text: String,
    /// Same registrable domain as the page it was found on
    pub internal: bool,
}

/// Output of [`extract_page`]
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub record: PageRecord,
    pub links: Vec<DiscoveredLink>,
}

/// Extracts a [`PageRecord`] from a fetched document
///
/// Relative links resolve against the document's final URL. Links are
/// classified against `url`, the page being extracted.
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links
/// - Anything that does not resolve to HTTP(S)
///
/// `rel="nofollow"` links are kept.
///
/// # Errors
///
/// * `ExtractionError::UnsupportedScheme` - `url` is not HTTP(S)
/// * `ExtractionError::EmptyDocument` - the document has no markup
pub fn extract_page(
    url: &Url,
    depth: u32,
    document: &FetchedDocument,
) -> Result<ExtractedPage, ExtractionError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractionError::UnsupportedScheme(url.scheme().to_string()));
    }

    if document.html.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    let html = Html::parse_document(&document.html);

    let mut record = PageRecord::bare(url, depth);
    record.metadata.extend(extract_metadata(&html, &document.final_url));

    let links = extract_links(&html, url, &document.final_url);
    for link in &links {
        let bucket = if link.internal {
            &mut record.links.internal
        } else {
            &mut record.links.external
        };
        bucket.push(link.url.to_string());
    }

    Ok(ExtractedPage { record, links })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn extract_metadata(html: &Html, base_url: &Url) -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();

    if let Some(title) = selector("title")
        .and_then(|s| html.select(&s).next().map(|e| element_text(&e)))
        .filter(|t| !t.is_empty())
    {
        metadata.insert("title".to_string(), Value::String(title));
    }

    if let Some(meta) = selector("meta[content]") {
        for element in html.select(&meta) {
            let attrs = element.value();
            let key = match (attrs.attr("name"), attrs.attr("property")) {
                (Some(name), _) if META_NAMES.contains(&name.to_lowercase().as_str()) => {
                    name.to_lowercase()
                }
                (_, Some(property)) if property.to_lowercase().starts_with("og:") => {
                    property.to_lowercase()
                }
                _ => continue,
            };

            let content = collapse_whitespace(attrs.attr("content").unwrap_or_default());
            if !content.is_empty() {
                metadata.entry(key).or_insert(Value::String(content));
            }
        }
    }

    if let Some(canonical) = selector("link[rel='canonical'][href]")
        .and_then(|s| html.select(&s).next())
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url))
    {
        metadata.insert("canonical".to_string(), Value::String(canonical.to_string()));
    }

    metadata
}

fn extract_links(html: &Html, page_url: &Url, base_url: &Url) -> Vec<DiscoveredLink> {
    let Some(anchor) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in html.select(&anchor) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if !seen.insert(url.to_string()) {
            continue;
        }

        let mut anchor_text = element_text(&element);
        if anchor_text.is_empty() {
            anchor_text = element.value().attr("title").unwrap_or_default().to_string();
        }

        links.push(DiscoveredLink {
            internal: same_site(&url, page_url),
            url,
            anchor_text,
        });
    }

    links
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}
