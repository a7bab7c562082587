//! Relevance scoring for frontier ordering
//!
//! Scores only order the frontier; they never reject a URL.

use std::collections::HashSet;
use url::Url;

/// Assigns a priority score in [0, 1] to a candidate link
pub trait UrlScorer: Send + Sync {
    /// Scores `url` using any available anchor text or surrounding context
    fn score(&self, url: &Url, anchor_context: &str) -> f64;
}

/// Keyword relevance scorer
///
/// Tokenizes the URL path and the anchor context, then counts how many
/// configured keywords appear. Keywords found in the path weigh more than
/// keywords found only in the anchor text. The result is normalized to
/// [0, 1] by the best possible score.
#[derive(Debug, Clone)]
pub struct KeywordRelevanceScorer {
    keywords: Vec<String>,
    path_weight: f64,
    anchor_weight: f64,
}

impl KeywordRelevanceScorer {
    pub fn new(keywords: &[String]) -> Self {
        let mut seen = HashSet::new();
        let keywords = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        Self {
            keywords,
            path_weight: 1.0,
            anchor_weight: 0.5,
        }
    }

    /// Overrides the weights applied to path and anchor matches
    pub fn with_weights(mut self, path_weight: f64, anchor_weight: f64) -> Self {
        self.path_weight = path_weight.max(0.0);
        self.anchor_weight = anchor_weight.max(0.0);
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl UrlScorer for KeywordRelevanceScorer {
    fn score(&self, url: &Url, anchor_context: &str) -> f64 {
        let best_per_keyword = self.path_weight.max(self.anchor_weight);
        if self.keywords.is_empty() || best_per_keyword <= 0.0 {
            return 0.0;
        }

        let path_tokens = tokenize(&format!("{} {}", url.path(), url.query().unwrap_or("")));
        let anchor_tokens = tokenize(anchor_context);

        let total: f64 = self
            .keywords
            .iter()
            .map(|keyword| {
                if path_tokens.contains(keyword.as_str()) {
                    self.path_weight
                } else if anchor_tokens.contains(keyword.as_str()) {
                    self.anchor_weight
                } else {
                    0.0
                }
            })
            .sum();

        let max = best_per_keyword * self.keywords.len() as f64;
        (total / max).clamp(0.0, 1.0)
    }
}

/// Splits text into lowercase alphanumeric tokens
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
