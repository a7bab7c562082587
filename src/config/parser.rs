use crate::config::types::Settings;
use crate::config::validation::validate_settings;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads process settings from the given TOML file
///
/// A missing file is not an error: the documented defaults are used and a
/// warning is logged. A file that exists but cannot be parsed or fails
/// validation is an error.
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use solv_crawler::config::load_settings;
///
/// let settings = load_settings(Path::new("solv-crawler.toml")).unwrap();
/// println!("Listening on port {}", settings.server.port);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        tracing::warn!(
            "Settings file {} not found, using defaults",
            path.display()
        );
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parses and validates settings from TOML text
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Computes a SHA-256 hash of the settings file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads settings and returns them with the hash of the file they came from
///
/// The hash is `None` when the file is absent and defaults were used.
pub fn load_settings_with_hash(path: &Path) -> Result<(Settings, Option<String>), ConfigError> {
    let settings = load_settings(path)?;
    let hash = if path.exists() {
        Some(compute_config_hash(path)?)
    } else {
        None
    };
    Ok((settings, hash))
}
