//! Execution outcomes distinguishing full success from partial success.

use super::PullRequestInfo;

/// Durable artifact created before a trailing step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialArtifact {
    /// A branch was created.
    Branch {
        /// Short name of the created branch.
        branch_name: String,
    },
    /// A pull request was created or reused.
    PullRequest(PullRequestInfo),
}

impl PartialArtifact {
    /// Returns a one-line description identifying the artifact.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Branch { branch_name } => format!("branch '{branch_name}'"),
            Self::PullRequest(pull_request) => {
                format!("pull request #{} ({})", pull_request.id(), pull_request.url())
            }
        }
    }
}

/// Outcome of one orchestration attempt.
///
/// `Partial` is a distinguished success-with-caveat: a durable side effect
/// happened before a trailing step failed, so the artifact must be reported
/// and must never be downgraded to a bare error. Partial outcomes travel on
/// the `Ok` path, which makes them structurally non-retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult<T> {
    /// Every step succeeded.
    Completed(T),
    /// A durable artifact exists but a trailing step failed.
    Partial {
        /// The artifact that was durably created.
        artifact: PartialArtifact,
        /// Why the trailing step failed.
        reason: String,
    },
}

impl<T> ExecutionResult<T> {
    /// Reports whether this outcome is partial.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Returns the completed payload, when every step succeeded.
    #[must_use]
    pub const fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(payload) => Some(payload),
            Self::Partial { .. } => None,
        }
    }
}
