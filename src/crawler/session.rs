//! Opaque session credential handed to the fetch backend

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Pre-authenticated browser session state
///
/// The crawl core never looks inside; it only passes the credential to the
/// fetch backend on every request. The blob must be a JSON document (the
/// storage-state format written by browser automation tools).
#[derive(Clone)]
pub struct SessionCredential {
    raw: Arc<str>,
}

impl SessionCredential {
    /// Wraps a JSON storage-state document
    pub fn from_json(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(|e| ConfigError::Credential(format!("not valid JSON: {}", e)))?;

        Ok(Self {
            raw: Arc::from(raw),
        })
    }

    /// Reads a storage-state file from disk
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Credential(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(raw)
    }

    /// The raw credential blob
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Builds a `Cookie` header value for a request to `url`
    ///
    /// Only the `cookies` array of the storage state is consulted. Expired
    /// cookies, secure cookies on plain HTTP, and cookies whose domain or
    /// path do not cover the URL are left out.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?.to_lowercase();
        let state: StorageState = serde_json::from_str(&self.raw).ok()?;
        let now = chrono::Utc::now().timestamp() as f64;

        let pairs: Vec<String> = state
            .cookies
            .iter()
            .filter(|cookie| cookie.matches(&host, url, now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

// Never print session secrets
impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("len", &self.raw.len())
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct StorageState {
    #[serde(default)]
    cookies: Vec<StoredCookie>,
}

#[derive(Debug, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    #[serde(default)]
    domain: String,
    #[serde(default = "default_cookie_path")]
    path: String,
    #[serde(default)]
    secure: bool,
    /// Unix seconds; zero or negative marks a session cookie
    #[serde(default)]
    expires: Option<f64>,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl StoredCookie {
    fn matches(&self, host: &str, url: &Url, now: f64) -> bool {
        if self.secure && url.scheme() != "https" {
            return false;
        }

        if matches!(self.expires, Some(expires) if expires > 0.0 && expires < now) {
            return false;
        }

        let domain = self.domain.trim_start_matches('.').to_lowercase();
        let domain_ok = domain.is_empty()
            || host == domain
            || host.ends_with(&format!(".{}", domain));

        domain_ok && url.path().starts_with(&self.path)
    }
}
