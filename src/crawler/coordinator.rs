//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Validating the run configuration before any network activity
//! - Seeding the frontier and running a fixed pool of workers over it
//! - Fetching, extracting, filtering, scoring and enqueueing links
//! - Cooperative cancellation and the page-count limit
//! - Assembling the final report

use crate::config::{validate_crawl_config, CrawlConfig};
use crate::crawler::fetcher::{FetchExecutor, FetchOutcome, PageFetcher};
use crate::crawler::parser::{extract_page, DiscoveredLink, PageRecord};
use crate::crawler::scheduler::{CrawlTask, Frontier, PushResult};
use crate::crawler::scorer::{KeywordRelevanceScorer, UrlScorer};
use crate::filter::FilterChain;
use crate::output::{CrawlReport, CrawlStatus, RunCounters};
use crate::state::{RunState, TaskOutcome};
use crate::{ConfigError, CrawlError};
use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
///
/// A coordinator runs exactly once; calling [`Coordinator::run`] again
/// returns [`CrawlError::InvalidTransition`].
pub struct Coordinator {
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    scorer: Option<Arc<dyn UrlScorer>>,
    state: RunState,
}

/// State shared by all workers of one run
struct CrawlContext {
    config: CrawlConfig,
    frontier: Frontier,
    filters: FilterChain,
    scorer: Arc<dyn UrlScorer>,
    executor: FetchExecutor,
    records: Mutex<Vec<PageRecord>>,
    counters: RunCounters,
    /// Stops dispatch; cancelled by the caller's token or the page limit
    stop: CancellationToken,
    started: Instant,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; validated when the run starts
    /// * `fetcher` - Backend used to load pages
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config,
            fetcher,
            scorer: None,
            state: RunState::Idle,
        }
    }

    /// Replaces the keyword scorer built from the config
    pub fn with_scorer(mut self, scorer: Arc<dyn UrlScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn transition(&mut self, next: RunState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl run {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn prepare(&self) -> Result<(Url, FilterChain), ConfigError> {
        let seed = validate_crawl_config(&self.config)?;
        let filters = FilterChain::from_config(&self.config, &seed)?;
        Ok((seed, filters))
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures never abort the run; they are logged and counted in
    /// the report's stats. Cancelling `cancel` stops dispatch of new tasks,
    /// lets in-flight tasks finish, and returns the partial results with a
    /// `cancelled` status.
    ///
    /// # Errors
    ///
    /// * `CrawlError::Config` - the configuration is invalid; nothing was fetched
    /// * `CrawlError::InvalidTransition` - this coordinator already ran
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<CrawlReport, CrawlError> {
        if !self.state.can_transition_to(RunState::Running) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: RunState::Running,
            });
        }

        let (seed, filters) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!("Invalid crawl configuration: {}", e);
                self.transition(RunState::Failed)?;
                return Err(e.into());
            }
        };

        self.transition(RunState::Running)?;
        let started_at = Utc::now();

        let scorer: Arc<dyn UrlScorer> = match &self.scorer {
            Some(scorer) => scorer.clone(),
            None => Arc::new(KeywordRelevanceScorer::new(&self.config.keywords)),
        };

        let ctx = Arc::new(CrawlContext {
            config: self.config.clone(),
            frontier: Frontier::new(self.config.max_depth),
            filters,
            executor: FetchExecutor::new(self.fetcher.clone(), &self.config),
            scorer,
            records: Mutex::new(Vec::new()),
            counters: RunCounters::new(),
            stop: cancel.child_token(),
            started: Instant::now(),
        });

        let seed_score = ctx.scorer.score(&seed, "");
        ctx.frontier.push(CrawlTask::seed(seed.clone(), seed_score));

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            seed,
            self.config.max_depth,
            self.config.concurrency
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.concurrency {
            workers.spawn(worker_loop(ctx.clone(), worker_id));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker terminated abnormally: {}", e);
            }
        }

        let status = if cancel.is_cancelled() {
            tracing::warn!("Crawl of {} cancelled, returning partial results", seed);
            CrawlStatus::Cancelled
        } else {
            CrawlStatus::Completed
        };

        let records = {
            let mut records = ctx.records.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *records)
        };
        let stats = ctx.counters.finish(started_at, Utc::now(), status);

        self.transition(RunState::Completed)?;

        tracing::info!(
            "Crawl completed: {} pages recorded, {} skipped, {} filtered in {:?}",
            stats.fetched,
            stats.skipped,
            stats.filtered,
            ctx.started.elapsed()
        );

        Ok(CrawlReport { records, stats })
    }
}

/// Pulls tasks until the frontier drains or dispatch stops
async fn worker_loop(ctx: Arc<CrawlContext>, worker_id: usize) {
    tracing::debug!("Worker {} started", worker_id);

    while let Some(task) = ctx.frontier.next(&ctx.stop).await {
        let outcome = ctx.process_task(&task).await;
        tracing::trace!("Worker {} finished {}: {:?}", worker_id, task.url, outcome);
    }

    tracing::debug!("Worker {} exiting", worker_id);
}

impl CrawlContext {
    /// Processes a single task
    ///
    /// This method:
    /// 1. Fetches the page through the executor
    /// 2. Checks the declared content type
    /// 3. Extracts metadata and links
    /// 4. Appends the record
    /// 5. Filters, scores and enqueues discovered links
    async fn process_task(&self, task: &CrawlTask) -> TaskOutcome {
        tracing::debug!(
            "Fetching {} (depth {}, score {:.2})",
            task.url,
            task.depth,
            task.score
        );

        let document = match self.executor.fetch(task, &self.stop).await {
            None => {
                tracing::debug!("Dispatch stopped before fetching {}", task.url);
                return TaskOutcome::Abandoned;
            }
            Some(FetchOutcome::Success(document)) => document,
            Some(FetchOutcome::Failure(e)) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                self.counters.record_skipped();
                return TaskOutcome::Skipped;
            }
        };

        let content_accepted = self.filters.accept_content_type(&document.content_type);
        if !content_accepted {
            self.counters.record_filtered();
            if !self.config.record_filtered_content {
                tracing::debug!(
                    "Dropping {}: content type '{}' not accepted",
                    task.url,
                    document.content_type
                );
                return TaskOutcome::Filtered;
            }
        }

        let (mut record, links) = if content_accepted {
            match extract_page(&task.url, task.depth, &document) {
                Ok(page) => (page.record, page.links),
                Err(e) => {
                    tracing::warn!("Failed to extract {}: {}", task.url, e);
                    self.counters.record_skipped();
                    return TaskOutcome::Skipped;
                }
            }
        } else {
            (PageRecord::bare(&task.url, task.depth), Vec::new())
        };

        record.metadata.insert("score".to_string(), Value::from(task.score));
        record
            .metadata
            .insert("status_code".to_string(), Value::from(document.status_code));
        if !document.content_type.is_empty() {
            record.metadata.insert(
                "content_type".to_string(),
                Value::String(document.content_type.clone()),
            );
        }
        if let Some(parent) = &task.parent_url {
            record
                .metadata
                .insert("parent_url".to_string(), Value::String(parent.to_string()));
        }

        if !self.append_record(record) {
            tracing::debug!("Page limit reached, discarding {}", task.url);
            return TaskOutcome::Discarded;
        }

        self.enqueue_links(task, &links);
        TaskOutcome::Recorded
    }

    /// Appends a record unless the page limit is already reached
    fn append_record(&self, record: PageRecord) -> bool {
        let count = {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            if self.config.max_pages.is_some_and(|max| records.len() >= max) {
                return false;
            }
            records.push(record);
            records.len()
        };

        self.counters.record_fetched();

        if let Some(max) = self.config.max_pages {
            if count >= max {
                tracing::info!("Reached page limit of {}, stopping dispatch", max);
                self.stop.cancel();
            }
        }

        // Progress reporting every 10 pages
        if count % 10 == 0 {
            let rate = count as f64 / self.started.elapsed().as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                count,
                self.frontier.len(),
                rate
            );
        }

        true
    }

    fn enqueue_links(&self, task: &CrawlTask, links: &[DiscoveredLink]) {
        if task.depth >= self.config.max_depth || self.stop.is_cancelled() {
            return;
        }

        let mut queued = 0;
        for link in links {
            if !link.internal && !self.config.follow_external {
                continue;
            }

            if !self.filters.accept(&link.url, task.depth) {
                self.counters.record_filtered();
                continue;
            }

            let score = self.scorer.score(&link.url, &link.anchor_text);
            match self
                .frontier
                .push(CrawlTask::child(task, link.url.clone(), score))
            {
                PushResult::Queued => queued += 1,
                PushResult::Duplicate => self.counters.record_duplicate(),
                PushResult::TooDeep | PushResult::Invalid => {}
            }
        }

        tracing::debug!(
            "Queued {} of {} links from {}",
            queued,
            links.len(),
            task.url
        );
    }
}

/// Runs a complete crawl with no external cancellation
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `fetcher` - Backend used to load pages
pub async fn run_crawl(
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<CrawlReport, CrawlError> {
    run_crawl_with_cancel(config, fetcher, CancellationToken::new()).await
}

/// Runs a complete crawl that stops early when `cancel` fires
pub async fn run_crawl_with_cancel(
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    Coordinator::new(config, fetcher).run(cancel).await
}
