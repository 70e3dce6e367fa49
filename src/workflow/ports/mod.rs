//! Port contracts for the remote work-tracking-and-git service.

mod git;
mod work_items;

pub use git::{
    CreatePullRequest, GitRemote, ObjectId, ProjectRef, PullRequestPayload, RefCreateError,
    RemoteRef, RepositoryId, RepositoryInfo,
};
pub use work_items::{PatchOperation, Relation, WorkItemPayload, WorkItemTracking};

use thiserror::Error;

/// Errors returned by remote-service port implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The service rejected the caller's credential.
    #[error("remote service rejected authentication ({status}): {message}")]
    Authentication {
        /// HTTP status code, 401 or 403.
        status: u16,
        /// Error body or message.
        message: String,
    },

    /// The request never produced a usable response.
    #[error("remote transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("remote API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or message.
        message: String,
    },

    /// The response payload could not be interpreted.
    #[error("remote response parse error: {0}")]
    Parse(String),
}

impl RemoteError {
    /// Reports whether this failure looks like an authentication failure:
    /// a 401/403 status or an unauthorized/forbidden message pattern.
    #[must_use]
    pub fn is_auth_signature(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Api { status, .. } if matches!(*status, 401 | 403) => true,
            Self::Transport(message) | Self::Parse(message) => message_looks_unauthorized(message),
            Self::Api { message, .. } => message_looks_unauthorized(message),
        }
    }
}

/// Message-pattern fallback for transports that lose the status code.
fn message_looks_unauthorized(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("unauthorized")
        || lower.contains("unauthorised")
        || lower.contains("forbidden")
        || lower.contains("401")
        || lower.contains("403")
}
