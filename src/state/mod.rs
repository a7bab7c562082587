//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: Lifecycle of a crawl run (idle, running, completed, failed)
//! - `TaskOutcome`: What happened to a single dequeued task

mod run_state;

// Re-export main types
pub use run_state::{RunState, TaskOutcome};
