//! Remote git port.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::RemoteError;
use crate::workflow::domain::BranchRef;

/// All-zero object id asserting ref non-existence in CAS updates.
const ZERO_OBJECT_ID: &str = "0000000000000000000000000000000000000000";

/// Repository identifier assigned by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepositoryId(Uuid);

impl RepositoryId {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a repository identifier from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Parse`] when the value is not a UUID.
    pub fn parse(value: &str) -> Result<Self, RemoteError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| RemoteError::Parse(format!("repository id is not a UUID: '{value}'")))
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project owning a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// Project identifier, when the service reported one.
    pub id: Option<Uuid>,
    /// Project display name.
    pub name: String,
}

impl ProjectRef {
    /// Returns the value to scope API routes with: the project id when
    /// known, otherwise the name.
    #[must_use]
    pub fn api_identifier(&self) -> String {
        self.id
            .map_or_else(|| self.name.clone(), |id| id.to_string())
    }
}

/// Repository metadata resolved from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Repository identifier.
    pub id: RepositoryId,
    /// Repository name.
    pub name: String,
    /// Owning project.
    pub project: ProjectRef,
    /// Default branch ref, when configured.
    pub default_branch: Option<String>,
    /// HTTPS clone URL, when reported.
    pub remote_url: Option<String>,
    /// SSH clone URL, when reported.
    pub ssh_url: Option<String>,
}

impl RepositoryInfo {
    /// Returns the `project/name` display path.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.project.name, self.name)
    }
}

/// Commit object id a ref points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wraps a raw object id.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the all-zero object id asserting non-existence.
    #[must_use]
    pub fn zero() -> Self {
        Self(ZERO_OBJECT_ID.to_owned())
    }

    /// Returns the object id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remote ref with the object id it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full ref name, e.g. `refs/heads/main`.
    pub name: String,
    /// Object id the ref points at.
    pub object_id: ObjectId,
}

/// Parameters for creating a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    /// Source branch ref.
    pub source_ref: BranchRef,
    /// Target branch ref.
    pub target_ref: BranchRef,
    /// Pull-request title.
    pub title: String,
    /// Pull-request description.
    pub description: String,
    /// Create the pull request as a draft.
    pub draft: bool,
}

/// Raw pull-request payload as returned by the remote service.
///
/// Field presence is validated by the orchestration layer; a missing id on
/// a created or reused pull request is a protocol violation there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestPayload {
    /// Pull-request identifier, when the service reported one.
    pub id: Option<u64>,
    /// Pull-request URL, when the service reported one.
    pub url: Option<String>,
    /// Draft flag, when the service reported one.
    pub is_draft: Option<bool>,
    /// Artifact identifier for relation linking, when reported.
    pub artifact_id: Option<String>,
}

/// Errors returned by the compare-and-swap ref creation capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefCreateError {
    /// A ref with the requested name already exists.
    #[error("ref name conflict")]
    NameConflict,

    /// The credential lacks the scope required to create branches.
    #[error("branch creation permission required")]
    PermissionDenied,

    /// The service rejected the update for another reason.
    #[error("ref update rejected{}", format_detail(.0))]
    Rejected(Option<String>),

    /// The request failed before the update was evaluated.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Renders the optional server message of a rejected update.
fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map_or_else(String::new, |message| format!(": {message}"))
}

/// Contract for the remote git operations the workflows need.
///
/// Ref creation is exposed as a narrow compare-and-swap capability so the
/// orchestration logic stays decoupled from the transport and is testable
/// against an in-memory implementation.
#[async_trait]
pub trait GitRemote: Send + Sync {
    /// Fetches a repository by name within a project.
    ///
    /// Returns `None` when the repository does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be reached or
    /// answers unexpectedly.
    async fn repository(
        &self,
        name: &str,
        project: &str,
    ) -> Result<Option<RepositoryInfo>, RemoteError>;

    /// Lists every repository visible in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the listing fails.
    async fn repositories(&self) -> Result<Vec<RepositoryInfo>, RemoteError>;

    /// Lists refs whose name starts with `filter` (e.g. `heads/main`).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the listing fails.
    async fn refs(
        &self,
        repository: &RepositoryInfo,
        filter: &str,
    ) -> Result<Vec<RemoteRef>, RemoteError>;

    /// Creates `name` via a single compare-and-swap ref update.
    ///
    /// The update succeeds only when the server-side value of the ref still
    /// equals `expected_old`; passing [`ObjectId::zero`] asserts that the
    /// ref must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`RefCreateError`] classifying conflict, missing permission,
    /// other rejections, and transport failures.
    async fn create_ref(
        &self,
        repository: &RepositoryInfo,
        name: &BranchRef,
        expected_old: &ObjectId,
        new_object: &ObjectId,
    ) -> Result<(), RefCreateError>;

    /// Lists active pull requests for the exact source/target ref pair.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the listing fails.
    async fn pull_requests(
        &self,
        repository: &RepositoryInfo,
        source_ref: &BranchRef,
        target_ref: &BranchRef,
    ) -> Result<Vec<PullRequestPayload>, RemoteError>;

    /// Creates a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when creation fails.
    async fn create_pull_request(
        &self,
        repository: &RepositoryInfo,
        request: &CreatePullRequest,
    ) -> Result<PullRequestPayload, RemoteError>;
}
