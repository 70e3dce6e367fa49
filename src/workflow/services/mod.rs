//! Orchestration services for the work-item workflow.

mod finish;
mod lookup;
mod refs;
mod relations;
mod retry;
mod start;
mod templates;

pub use finish::{FinishReport, FinishRequest, FinishService};
pub use relations::{LinkOutcome, RelationLinker};
pub use retry::AuthRetry;
pub use start::{StartReport, StartRequest, StartService};

use thiserror::Error;

use crate::auth::services::CredentialError;
use crate::repo::ports::LocalGitError;
use crate::repo::services::RepoResolutionError;
use crate::workflow::domain::{WorkItemId, WorkflowDomainError};
use crate::workflow::ports::RemoteError;

/// Errors surfaced by the orchestration services.
///
/// Partial successes are not errors: they travel on the `Ok` path as
/// [`crate::workflow::domain::ExecutionResult::Partial`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Repository-target resolution failed.
    #[error(transparent)]
    Repo(#[from] RepoResolutionError),

    /// A local git operation failed.
    #[error(transparent)]
    LocalGit(#[from] LocalGitError),

    /// Credential reacquisition failed during an auth retry.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The work item does not exist.
    #[error("work item {0} was not found")]
    WorkItemNotFound(WorkItemId),

    /// The repository does not exist where the identifier pointed.
    #[error("repository '{repository}' was not found{}", format_project_scope(.project))]
    RepositoryNotFound {
        /// Repository name looked up.
        repository: String,
        /// Project scope, when the lookup was project-scoped.
        project: Option<String>,
    },

    /// A caller input failed validation.
    #[error("{0}")]
    Validation(String),

    /// A bare repository name matched repositories in several projects.
    #[error("repository '{repository}' exists in multiple projects ({}). Use a URL with a project segment or a local path", .projects.join(", "))]
    AmbiguousRepository {
        /// Repository name looked up.
        repository: String,
        /// Projects containing a repository with that name.
        projects: Vec<String>,
    },

    /// No base-branch candidate exists in the repository.
    #[error("base branch '{requested}' was not found in repository '{repository}'{}", format_available(.available))]
    BaseBranchNotFound {
        /// Branch that was requested (short name).
        requested: String,
        /// Repository searched.
        repository: String,
        /// Sample of branches that do exist.
        available: Vec<String>,
    },

    /// No target-branch candidate exists in the repository.
    #[error("target branch '{requested}' was not found in '{repository}'")]
    TargetBranchNotFound {
        /// Branch that was requested (short name).
        requested: String,
        /// Repository searched, as `project/name`.
        repository: String,
    },

    /// The branch to create already exists.
    #[error("branch '{branch}' already exists in '{repository}'")]
    BranchExists {
        /// Short branch name.
        branch: String,
        /// Repository, as `project/name`.
        repository: String,
    },

    /// The credential lacks a required scope.
    #[error("{0}")]
    InsufficientScope(String),

    /// The ref update was rejected for another reason.
    #[error("failed to create branch '{branch}'{}", format_detail(.detail))]
    BranchCreationFailed {
        /// Short branch name.
        branch: String,
        /// Server-provided message, when present.
        detail: Option<String>,
    },

    /// No remote branch matches the work item.
    #[error("could not infer a remote branch for work item {work_item}. Expected a branch like bug/{work_item}-... or feature/{work_item}-...")]
    SourceBranchNotFound {
        /// Work item whose branch was searched for.
        work_item: WorkItemId,
    },

    /// Multiple remote branches match the work item.
    #[error("multiple remote branches match work item {work_item}: {}. Re-run using a local --repo path from the intended branch", .candidates.join(", "))]
    AmbiguousSourceBranch {
        /// Work item whose branch was searched for.
        work_item: WorkItemId,
        /// Matching short branch names.
        candidates: Vec<String>,
    },

    /// The checked-out branch does not correspond to the work item.
    #[error("current branch '{branch}' does not appear to match work item {work_item}. Check out the intended branch and rerun")]
    SourceBranchMismatch {
        /// Currently checked-out branch.
        branch: String,
        /// Work item being finished.
        work_item: WorkItemId,
    },

    /// Source and target resolve to the same branch.
    #[error("source branch '{branch}' is the same as the target branch")]
    SourceEqualsTarget {
        /// The conflicting short branch name.
        branch: String,
    },

    /// The remote response is missing a required field.
    #[error("remote service protocol violation: {0}")]
    Protocol(String),

    /// Rendering an output template failed.
    #[error("template rendering failed: {0}")]
    Template(String),
}

impl WorkflowError {
    /// Reports whether this failure signature indicates an authentication
    /// failure eligible for a one-shot credential retry.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Remote(err) => err.is_auth_signature(),
            _ => false,
        }
    }
}

/// Renders the optional project scope of a repository lookup.
fn format_project_scope(project: &Option<String>) -> String {
    project
        .as_ref()
        .map_or_else(|| " in the organization".to_owned(), |name| format!(" in project '{name}'"))
}

/// Renders the available-branches hint.
fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(". Available branches: {}", available.join(", "))
    }
}

/// Renders an optional server-provided message.
fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map_or_else(String::new, |message| format!(". {message}"))
}
