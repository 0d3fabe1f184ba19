//! Queue errors

use thiserror::Error;

use crate::job::JobState;

/// Errors that can occur in the print queue
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The tenant's pending backlog is at capacity
    #[error("Queue full: {capacity} pending jobs for this company")]
    Full { capacity: usize },

    /// No job with this id is known to the tenant's queue
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job is not in a state that permits the requested transition
    #[error("Invalid transition from {from:?}")]
    InvalidTransition { from: JobState },
}
