//! Run statistics
//!
//! Workers bump shared [`RunCounters`] while the crawl is in progress; the
//! coordinator freezes them into a [`CrawlStats`] when the run ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    /// The frontier drained (or the page limit was reached)
    Completed,
    /// The caller cancelled the run; results are partial
    Cancelled,
}

/// Summary counters for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages recorded
    pub fetched: usize,

    /// Tasks lost to fetch or extraction failures
    pub skipped: usize,

    /// Links and responses rejected by the filter chain
    pub filtered: usize,

    /// Links dropped because their URL was already seen
    pub duplicates: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: CrawlStatus,
}

impl CrawlStats {
    /// Share of dequeued tasks that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.fetched + self.skipped;
        if attempted == 0 {
            0.0
        } else {
            (self.fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Live counters shared by crawl workers
#[derive(Debug, Default)]
pub struct RunCounters {
    fetched: AtomicUsize,
    skipped: AtomicUsize,
    filtered: AtomicUsize,
    duplicates: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetched(&self) -> usize {
        self.fetched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a summary
    pub fn finish(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        status: CrawlStatus,
    ) -> CrawlStats {
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        CrawlStats {
            fetched: self.fetched.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            started_at,
            finished_at,
            duration_ms,
            status,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Status: {:?}", stats.status);
    println!("  Pages recorded: {}", stats.fetched);
    println!("  Pages skipped: {}", stats.skipped);
    println!("  Filtered: {}", stats.filtered);
    println!("  Duplicate links: {}", stats.duplicates);
    println!("  Duration: {:.1}s", stats.duration_ms as f64 / 1000.0);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.fetched,
        stats.fetched + stats.skipped
    );
}
