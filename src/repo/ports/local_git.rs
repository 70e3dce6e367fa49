//! Local git working-tree port.

use async_trait::async_trait;
use camino::Utf8Path;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Result type for local git operations.
pub type LocalGitResult<T> = Result<T, LocalGitError>;

/// Errors returned by local git implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocalGitError {
    /// A git invocation exited unsuccessfully.
    #[error("git command failed: {command}: {detail}")]
    CommandFailed {
        /// The failing command line.
        command: String,
        /// Stderr or spawn failure detail.
        detail: String,
    },

    /// A git invocation produced output that could not be interpreted.
    #[error("unexpected output from {command}: {detail}")]
    UnexpectedOutput {
        /// The command whose output was rejected.
        command: String,
        /// What was wrong with the output.
        detail: String,
    },
}

/// Contract for the local git operations the workflows need.
///
/// Only branch-resolution primitives are exposed; this is deliberately not
/// a general git porcelain.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocalGit: Send + Sync {
    /// Reports whether `path` is inside a git working tree.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when git cannot be invoked at all.
    async fn is_work_tree(&self, path: &Utf8Path) -> LocalGitResult<bool>;

    /// Returns the URL of the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when the remote is not configured.
    async fn origin_remote_url(&self, path: &Utf8Path) -> LocalGitResult<String>;

    /// Returns the short name of the currently checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when HEAD cannot be resolved.
    async fn current_branch(&self, path: &Utf8Path) -> LocalGitResult<String>;

    /// Reports whether `branch` has a remote-tracking branch.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when git cannot be invoked at all.
    async fn has_tracking_branch(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<bool>;

    /// Returns how many commits `branch` is ahead of its upstream.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when the count cannot be computed.
    async fn ahead_count(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<u64>;

    /// Pushes `branch` to `origin`, setting the upstream if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError`] when the push fails.
    async fn push_to_origin(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<()>;
}
