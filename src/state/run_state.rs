/// Lifecycle states of a crawl run and outcomes of individual tasks
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the lifecycle of a crawl run
///
/// ```text
/// Idle -> Running -> Completed
///   \         \
///    \-> Failed  \-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Configured but not started
    Idle,

    /// Workers are draining the frontier
    Running,

    /// The frontier drained or the run was cancelled; results are available
    Completed,

    /// The run could not start (invalid configuration)
    Failed,
}

impl RunState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to a single dequeued task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// A page record was appended
    Recorded,

    /// Fetch or extraction failed; nothing recorded
    Skipped,

    /// The response content type was rejected and the page dropped
    Filtered,

    /// The page-count limit was already reached
    Discarded,

    /// Dispatch stopped before the request was sent; nothing counted
    Abandoned,
}

impl TaskOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded)
    }
}
