//! Error types for workflow domain validation.

use thiserror::Error;

/// Errors returned while constructing workflow domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The work item identifier is not a positive integer.
    #[error("work item ID must be a positive integer, got {0}")]
    InvalidWorkItemId(u64),

    /// A required work-item field is missing or blank.
    #[error("work item is missing required field: {0}")]
    MissingField(String),

    /// A branch name or ref is empty after trimming.
    #[error("branch name cannot be empty")]
    EmptyBranchName,

    /// A pull request identifier is not a positive integer.
    #[error("pull request ID must be a positive integer, got {0}")]
    InvalidPullRequestId(u64),
}
