//! Pull-request value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BranchRef, WorkflowDomainError};

/// Positive pull-request identifier assigned by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(u64);

impl PullRequestId {
    /// Creates a validated pull-request identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidPullRequestId`] when the value
    /// is zero.
    pub const fn new(value: u64) -> Result<Self, WorkflowDomainError> {
        if value == 0 {
            return Err(WorkflowDomainError::InvalidPullRequestId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the finish workflow created or reused its pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestAction {
    /// A new pull request was created.
    Created,
    /// An existing active pull request was reused.
    Reused,
}

impl PullRequestAction {
    /// Returns the lowercase display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Reused => "reused",
        }
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated pull-request details reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    id: PullRequestId,
    url: String,
    source_ref: BranchRef,
    target_ref: BranchRef,
    is_draft: bool,
    artifact_id: Option<String>,
}

impl PullRequestInfo {
    /// Creates pull-request details from validated parts.
    #[must_use]
    pub const fn new(
        id: PullRequestId,
        url: String,
        source_ref: BranchRef,
        target_ref: BranchRef,
        is_draft: bool,
        artifact_id: Option<String>,
    ) -> Self {
        Self {
            id,
            url,
            source_ref,
            target_ref,
            is_draft,
            artifact_id,
        }
    }

    /// Returns the pull-request identifier.
    #[must_use]
    pub const fn id(&self) -> PullRequestId {
        self.id
    }

    /// Returns the browsable pull-request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the source branch ref.
    #[must_use]
    pub const fn source_ref(&self) -> &BranchRef {
        &self.source_ref
    }

    /// Returns the target branch ref.
    #[must_use]
    pub const fn target_ref(&self) -> &BranchRef {
        &self.target_ref
    }

    /// Reports whether the pull request is a draft.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.is_draft
    }

    /// Returns the server-reported artifact identifier, when present.
    #[must_use]
    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }
}
