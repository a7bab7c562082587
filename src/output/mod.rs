//! Output module for crawl results
//!
//! This module handles:
//! - The [`CrawlReport`] handed back to callers
//! - Recording crawl statistics
//! - Ordering and exporting page records

pub mod stats;

pub use stats::{print_statistics, CrawlStats, CrawlStatus, RunCounters};

use crate::crawler::PageRecord;
use serde::{Deserialize, Serialize};

/// Everything a finished run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Page records in completion order
    pub records: Vec<PageRecord>,
    pub stats: CrawlStats,
}

impl CrawlReport {
    pub fn total_pages(&self) -> usize {
        self.records.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.stats.status == CrawlStatus::Cancelled
    }

    /// Returns the records ordered by depth, then URL
    pub fn sorted_records(&self) -> Vec<PageRecord> {
        let mut records = self.records.clone();
        sort_records(&mut records);
        records
    }
}

/// Orders records by depth, then URL
///
/// Completion order depends on scheduling; this gives callers a
/// deterministic view for comparison and display.
pub fn sort_records(records: &mut [PageRecord]) {
    records.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));
}

/// Serializes records as pretty-printed JSON
pub fn records_to_json(records: &[PageRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
