use crate::filter::UrlFilter;
use url::Url;

/// File extensions with a well-known media type
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

/// Accepts documents whose content type is in a configured set
///
/// Before a fetch the type is guessed from the URL's file extension; paths
/// without a known extension pass. After a fetch the declared response type
/// is checked with [`ContentTypeFilter::accepts_content_type`].
#[derive(Debug, Clone)]
pub struct ContentTypeFilter {
    allowed: Vec<String>,
}

impl ContentTypeFilter {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
        }
    }

    /// Checks a declared `Content-Type` value such as `text/html; charset=utf-8`
    ///
    /// A missing or empty header is accepted; the page is then treated as
    /// whatever the extractor can make of it.
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if media_type.is_empty() {
            return true;
        }

        self.allowed.iter().any(|allowed| media_type_matches(allowed, &media_type))
    }
}

/// Matches `type/subtype` against an allowed entry, which may be `type/*`
fn media_type_matches(allowed: &str, media_type: &str) -> bool {
    match allowed.strip_suffix("/*") {
        Some(major) => media_type
            .split('/')
            .next()
            .is_some_and(|candidate| candidate == major),
        None => allowed == media_type,
    }
}

fn guess_media_type(url: &Url) -> Option<&'static str> {
    let last_segment = url.path_segments()?.last()?;
    let (_, extension) = last_segment.rsplit_once('.')?;
    let extension = extension.to_lowercase();

    EXTENSION_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
}

impl UrlFilter for ContentTypeFilter {
    fn name(&self) -> &'static str {
        "content_type"
    }

    fn accept(&self, url: &Url, _source_depth: u32) -> bool {
        match guess_media_type(url) {
            Some(media_type) => self.accepts_content_type(media_type),
            None => true,
        }
    }
}
