//! Frontier queue for best-first traversal
//!
//! This module handles:
//! - Priority ordering of pending tasks (score desc, depth asc, FIFO)
//! - The visited set, with an atomic check-and-insert on push
//! - Depth limiting
//! - Tracking in-flight tasks so idle workers know when the crawl is drained

use crate::url::normalize_url;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlTask {
    /// Absolute URL to fetch (normalized once queued)
    pub url: Url,

    /// Distance from the seed, which is depth 0
    pub depth: u32,

    /// Relevance score used for ordering
    pub score: f64,

    /// Page the link was discovered on; `None` for the seed
    pub parent_url: Option<Url>,
}

impl CrawlTask {
    /// Creates the depth-0 task for a seed URL
    pub fn seed(url: Url, score: f64) -> Self {
        Self {
            url,
            depth: 0,
            score,
            parent_url: None,
        }
    }

    /// Creates a task for a link found on `parent`, one level deeper
    pub fn child(parent: &CrawlTask, url: Url, score: f64) -> Self {
        Self {
            url,
            depth: parent.depth + 1,
            score,
            parent_url: Some(parent.url.clone()),
        }
    }
}

/// Result of offering a task to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushResult {
    /// The task was queued
    Queued,
    /// The URL was already queued or fetched during this run
    Duplicate,
    /// The task is deeper than the configured limit
    TooDeep,
    /// The URL could not be normalized
    Invalid,
}

/// A task with its insertion sequence number
#[derive(Debug, Clone)]
struct QueuedTask {
    task: CrawlTask,
    seq: u64,
}

// BinaryHeap pops the greatest element: higher score first, then shallower,
// then earlier insertion
impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.task
            .score
            .total_cmp(&other.task.score)
            .then_with(|| other.task.depth.cmp(&self.task.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

#[derive(Debug, Default)]
struct FrontierState {
    queue: BinaryHeap<QueuedTask>,
    visited: HashSet<String>,
    next_seq: u64,
    in_flight: usize,
}

/// Thread-safe priority frontier shared by all crawl workers
///
/// The frontier owns the visited set: a URL is marked visited when it is
/// first queued, so it is fetched at most once per run no matter how many
/// workers discover it.
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier that refuses tasks deeper than `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            max_depth,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a task to the frontier
    ///
    /// Tasks deeper than the limit, and URLs already seen after
    /// normalization, are silently dropped.
    pub fn push(&self, mut task: CrawlTask) -> PushResult {
        if task.depth > self.max_depth {
            return PushResult::TooDeep;
        }

        let normalized = match normalize_url(task.url.as_str()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping unnormalizable URL {}: {}", task.url, e);
                return PushResult::Invalid;
            }
        };

        {
            let mut state = self.lock();
            if !state.visited.insert(normalized.to_string()) {
                return PushResult::Duplicate;
            }

            task.url = normalized;
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(QueuedTask { task, seq });
        }

        self.notify.notify_waiters();
        PushResult::Queued
    }

    /// Pops the highest-priority task without waiting
    ///
    /// The caller must hand the task back through [`Frontier::complete`]
    /// once it has finished processing it.
    pub fn pop(&self) -> Option<CrawlTask> {
        let mut state = self.lock();
        let queued = state.queue.pop()?;
        state.in_flight += 1;
        Some(queued.task)
    }

    /// Marks one popped task as fully processed, including its pushes
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Waits for the next task
    ///
    /// Returns `None` once the frontier is empty with no task in flight (no
    /// further work can appear), or when `stop` is cancelled. The returned
    /// lease completes the task when dropped.
    pub async fn next(&self, stop: &CancellationToken) -> Option<TaskLease<'_>> {
        loop {
            if stop.is_cancelled() {
                return None;
            }

            // Register interest before inspecting state so a push or
            // completion between the check and the await is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let drained = {
                let mut state = self.lock();
                if let Some(queued) = state.queue.pop() {
                    state.in_flight += 1;
                    return Some(TaskLease {
                        frontier: self,
                        task: queued.task,
                    });
                }
                state.in_flight == 0
            };

            if drained {
                self.notify.notify_waiters();
                return None;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = stop.cancelled() => return None,
            }
        }
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of popped tasks not yet completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct URLs seen this run
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Returns true if the URL (after normalization) was already queued
    pub fn is_visited(&self, url: &Url) -> bool {
        normalize_url(url.as_str())
            .map(|u| self.lock().visited.contains(u.as_str()))
            .unwrap_or(false)
    }

    /// Copies the queued tasks in pop order
    pub fn snapshot(&self) -> Vec<CrawlTask> {
        let state = self.lock();
        let mut queued: Vec<QueuedTask> = state.queue.iter().cloned().collect();
        queued.sort_by(|a, b| b.cmp(a));
        queued.into_iter().map(|q| q.task).collect()
    }
}

/// A task checked out of the frontier
///
/// Dropping the lease marks the task complete, so a worker that panics or
/// is aborted mid-task cannot stall the crawl.
#[derive(Debug)]
pub struct TaskLease<'a> {
    frontier: &'a Frontier,
    task: CrawlTask,
}

impl Deref for TaskLease<'_> {
    type Target = CrawlTask;

    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

impl Drop for TaskLease<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
