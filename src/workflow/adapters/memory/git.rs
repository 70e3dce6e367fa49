//! Thread-safe in-memory git remote for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::workflow::domain::BranchRef;
use crate::workflow::ports::{
    CreatePullRequest, GitRemote, ObjectId, PullRequestPayload, RefCreateError, RemoteError,
    RemoteRef, RepositoryInfo,
};

/// First id handed out to created pull requests.
const FIRST_CREATED_PULL_REQUEST_ID: u64 = 1000;

/// Injected ref-creation failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedRefFailure {
    /// Report a name conflict.
    NameConflict,
    /// Report a missing branch-creation permission.
    PermissionDenied,
    /// Report a generic rejection.
    Rejected,
}

#[derive(Debug)]
struct StoredPullRequest {
    id: u64,
    repository: String,
    source_ref: String,
    target_ref: String,
    is_draft: bool,
    artifact_id: Option<String>,
}

#[derive(Debug, Default)]
struct GitState {
    repositories: Vec<RepositoryInfo>,
    refs: HashMap<String, Vec<RemoteRef>>,
    pull_requests: Vec<StoredPullRequest>,
    next_pull_request_id: Option<u64>,
    fail_ref_creation: Option<InjectedRefFailure>,
    omit_created_pull_request_id: bool,
}

/// Thread-safe in-memory git remote with failure injection.
///
/// Ref creation implements only the create path of the compare-and-swap
/// contract: the expected old object id must be the all-zero id, and an
/// existing ref with the same name (case-insensitive) is a name conflict.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGitRemote {
    state: Arc<RwLock<GitState>>,
}

impl InMemoryGitRemote {
    /// Creates an empty remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a repository.
    pub fn add_repository(&self, repository: RepositoryInfo) {
        self.write().repositories.push(repository);
    }

    /// Seeds a ref pointing at `object_id`.
    pub fn add_ref(&self, repository: &RepositoryInfo, name: &str, object_id: &str) {
        self.write()
            .refs
            .entry(repository.id.to_string())
            .or_default()
            .push(RemoteRef {
                name: name.to_owned(),
                object_id: ObjectId::new(object_id.to_owned()),
            });
    }

    /// Seeds an active pull request.
    pub fn seed_pull_request(
        &self,
        repository: &RepositoryInfo,
        id: u64,
        source_ref: &str,
        target_ref: &str,
        is_draft: bool,
        artifact_id: Option<&str>,
    ) {
        self.write().pull_requests.push(StoredPullRequest {
            id,
            repository: repository.id.to_string(),
            source_ref: source_ref.to_owned(),
            target_ref: target_ref.to_owned(),
            is_draft,
            artifact_id: artifact_id.map(str::to_owned),
        });
    }

    /// Makes subsequent ref creations fail with the given classification.
    pub fn set_fail_ref_creation(&self, failure: Option<InjectedRefFailure>) {
        self.write().fail_ref_creation = failure;
    }

    /// Makes created pull requests come back without an id.
    pub fn set_omit_created_pull_request_id(&self, omit: bool) {
        self.write().omit_created_pull_request_id = omit;
    }

    /// Reports whether a ref exists (case-insensitive).
    #[must_use]
    pub fn has_ref(&self, repository: &RepositoryInfo, name: &str) -> bool {
        self.read()
            .refs
            .get(&repository.id.to_string())
            .is_some_and(|refs| {
                refs.iter()
                    .any(|remote_ref| remote_ref.name.eq_ignore_ascii_case(name))
            })
    }

    /// Returns how many pull requests exist for the repository.
    #[must_use]
    pub fn pull_request_count(&self, repository: &RepositoryInfo) -> usize {
        let key = repository.id.to_string();
        self.read()
            .pull_requests
            .iter()
            .filter(|stored| stored.repository == key)
            .count()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, GitState> {
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, GitState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Converts a stored pull request into the port payload.
fn payload_of(stored: &StoredPullRequest) -> PullRequestPayload {
    PullRequestPayload {
        id: Some(stored.id),
        url: None,
        is_draft: Some(stored.is_draft),
        artifact_id: stored.artifact_id.clone(),
    }
}

#[async_trait]
impl GitRemote for InMemoryGitRemote {
    async fn repository(
        &self,
        name: &str,
        project: &str,
    ) -> Result<Option<RepositoryInfo>, RemoteError> {
        Ok(self
            .read()
            .repositories
            .iter()
            .find(|repository| {
                repository.name.eq_ignore_ascii_case(name)
                    && (repository.project.name.eq_ignore_ascii_case(project)
                        || repository
                            .project
                            .id
                            .is_some_and(|id| id.to_string().eq_ignore_ascii_case(project)))
            })
            .cloned())
    }

    async fn repositories(&self) -> Result<Vec<RepositoryInfo>, RemoteError> {
        Ok(self.read().repositories.clone())
    }

    async fn refs(
        &self,
        repository: &RepositoryInfo,
        filter: &str,
    ) -> Result<Vec<RemoteRef>, RemoteError> {
        let state = self.read();
        let refs = state
            .refs
            .get(&repository.id.to_string())
            .cloned()
            .unwrap_or_default();
        let filter_lower = filter.to_lowercase();
        Ok(refs
            .into_iter()
            .filter(|remote_ref| {
                remote_ref
                    .name
                    .strip_prefix("refs/")
                    .unwrap_or(&remote_ref.name)
                    .to_lowercase()
                    .starts_with(&filter_lower)
            })
            .collect())
    }

    async fn create_ref(
        &self,
        repository: &RepositoryInfo,
        name: &BranchRef,
        expected_old: &ObjectId,
        new_object: &ObjectId,
    ) -> Result<(), RefCreateError> {
        let mut state = self.write();

        match state.fail_ref_creation {
            Some(InjectedRefFailure::NameConflict) => return Err(RefCreateError::NameConflict),
            Some(InjectedRefFailure::PermissionDenied) => {
                return Err(RefCreateError::PermissionDenied);
            }
            Some(InjectedRefFailure::Rejected) => {
                return Err(RefCreateError::Rejected(Some(
                    "injected ref rejection".to_owned(),
                )));
            }
            None => {}
        }

        if expected_old != &ObjectId::zero() {
            return Err(RefCreateError::Rejected(Some(
                "the in-memory remote only supports create-style updates".to_owned(),
            )));
        }

        let refs = state.refs.entry(repository.id.to_string()).or_default();
        if refs
            .iter()
            .any(|remote_ref| remote_ref.name.eq_ignore_ascii_case(name.as_str()))
        {
            return Err(RefCreateError::NameConflict);
        }

        refs.push(RemoteRef {
            name: name.as_str().to_owned(),
            object_id: new_object.clone(),
        });
        Ok(())
    }

    async fn pull_requests(
        &self,
        repository: &RepositoryInfo,
        source_ref: &BranchRef,
        target_ref: &BranchRef,
    ) -> Result<Vec<PullRequestPayload>, RemoteError> {
        let key = repository.id.to_string();
        Ok(self
            .read()
            .pull_requests
            .iter()
            .filter(|stored| {
                stored.repository == key
                    && stored.source_ref.eq_ignore_ascii_case(source_ref.as_str())
                    && stored.target_ref.eq_ignore_ascii_case(target_ref.as_str())
            })
            .map(payload_of)
            .collect())
    }

    async fn create_pull_request(
        &self,
        repository: &RepositoryInfo,
        request: &CreatePullRequest,
    ) -> Result<PullRequestPayload, RemoteError> {
        let mut state = self.write();
        let id = state
            .next_pull_request_id
            .unwrap_or(FIRST_CREATED_PULL_REQUEST_ID);
        state.next_pull_request_id = Some(id.saturating_add(1));

        state.pull_requests.push(StoredPullRequest {
            id,
            repository: repository.id.to_string(),
            source_ref: request.source_ref.as_str().to_owned(),
            target_ref: request.target_ref.as_str().to_owned(),
            is_draft: request.draft,
            artifact_id: None,
        });

        let omit_id = state.omit_created_pull_request_id;
        Ok(PullRequestPayload {
            id: if omit_id { None } else { Some(id) },
            url: None,
            is_draft: Some(request.draft),
            artifact_id: None,
        })
    }
}
