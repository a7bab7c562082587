//! URL handling module
//!
//! This module provides URL normalization, domain extraction, registrable
//! domain computation for internal/external classification, and the
//! wildcard/glob matching used by the filter chain.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, registrable_domain, same_site};
pub use matcher::{compile_pattern, matches_wildcard, REGEX_PREFIX};
pub use normalize::normalize_url;
