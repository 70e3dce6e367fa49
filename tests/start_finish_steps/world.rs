//! Shared world state for start/finish lifecycle BDD scenarios.

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use rstest::fixture;
use uuid::Uuid;

use workcycle::auth::domain::{CredentialSource, OrganizationUrl, ResolvedCredentials};
use workcycle::repo::ports::{LocalGit, LocalGitError, LocalGitResult};
use workcycle::workflow::adapters::memory::{InMemoryGitRemote, InMemoryWorkItemTracking};
use workcycle::workflow::domain::ExecutionResult;
use workcycle::workflow::ports::RepositoryInfo;
use workcycle::workflow::services::{
    FinishReport, FinishRequest, FinishService, StartReport, StartRequest, StartService,
    WorkflowError,
};

/// Local-git stub for url-mode scenarios; any call is unexpected.
pub struct UnusedLocalGit;

/// Error returned when a scenario unexpectedly touches local git.
fn unexpected(call: &str) -> LocalGitError {
    LocalGitError::CommandFailed {
        command: call.to_owned(),
        detail: "local git must not be used in url-mode scenarios".to_owned(),
    }
}

#[async_trait]
impl LocalGit for UnusedLocalGit {
    async fn is_work_tree(&self, _path: &Utf8Path) -> LocalGitResult<bool> {
        Err(unexpected("is_work_tree"))
    }

    async fn origin_remote_url(&self, _path: &Utf8Path) -> LocalGitResult<String> {
        Err(unexpected("origin_remote_url"))
    }

    async fn current_branch(&self, _path: &Utf8Path) -> LocalGitResult<String> {
        Err(unexpected("current_branch"))
    }

    async fn has_tracking_branch(&self, _path: &Utf8Path, _branch: &str) -> LocalGitResult<bool> {
        Err(unexpected("has_tracking_branch"))
    }

    async fn ahead_count(&self, _path: &Utf8Path, _branch: &str) -> LocalGitResult<u64> {
        Err(unexpected("ahead_count"))
    }

    async fn push_to_origin(&self, _path: &Utf8Path, _branch: &str) -> LocalGitResult<()> {
        Err(unexpected("push_to_origin"))
    }
}

/// Object id every seeded ref points at.
pub const SEED_OBJECT_ID: &str = "2222222222222222222222222222222222222222";

/// Scenario world for start/finish lifecycle behaviour tests.
pub struct StartFinishWorld {
    pub work_items: InMemoryWorkItemTracking,
    pub git: InMemoryGitRemote,
    pub repository: Option<RepositoryInfo>,
    pub credentials: ResolvedCredentials,
    pub start_outcome: Option<Result<ExecutionResult<StartReport>, WorkflowError>>,
    pub finish_outcome: Option<Result<ExecutionResult<FinishReport>, WorkflowError>>,
}

impl StartFinishWorld {
    /// Creates a world with empty stores and `myorg` credentials.
    #[must_use]
    pub fn new() -> Self {
        let organization_url =
            OrganizationUrl::normalize("myorg").expect("organization should normalize");
        Self {
            work_items: InMemoryWorkItemTracking::new(),
            git: InMemoryGitRemote::new(),
            repository: None,
            credentials: ResolvedCredentials::new(
                "myorg".to_owned(),
                organization_url,
                "scenario-token".to_owned(),
                CredentialSource::Flag,
                CredentialSource::Env,
            ),
            start_outcome: None,
            finish_outcome: None,
        }
    }

    /// Registers the scenario repository.
    pub fn add_repository(&mut self, name: &str, project: &str, default_branch: &str) {
        let repository = RepositoryInfo {
            id: workcycle::workflow::ports::RepositoryId::from_uuid(Uuid::new_v4()),
            name: name.to_owned(),
            project: workcycle::workflow::ports::ProjectRef {
                id: Some(Uuid::new_v4()),
                name: project.to_owned(),
            },
            default_branch: Some(format!("refs/heads/{default_branch}")),
            remote_url: Some(self.repo_url_for(project, name)),
            ssh_url: None,
        };
        self.git.add_repository(repository.clone());
        self.git
            .add_ref(&repository, &format!("refs/heads/{default_branch}"), SEED_OBJECT_ID);
        self.repository = Some(repository);
    }

    /// Returns the url-mode `--repo` value for the scenario repository.
    #[must_use]
    pub fn repo_url(&self) -> String {
        let repository = self
            .repository
            .as_ref()
            .expect("scenario should have registered a repository");
        self.repo_url_for(&repository.project.name, &repository.name)
    }

    fn repo_url_for(&self, project: &str, name: &str) -> String {
        format!(
            "{}/{project}/_git/{name}",
            self.credentials.organization_url().as_str()
        )
    }

    /// Builds the start service over the world's stores.
    #[must_use]
    pub fn start_service(
        &self,
    ) -> StartService<InMemoryWorkItemTracking, InMemoryGitRemote, UnusedLocalGit> {
        StartService::new(
            Arc::new(self.work_items.clone()),
            Arc::new(self.git.clone()),
            Arc::new(UnusedLocalGit),
        )
    }

    /// Builds the finish service over the world's stores.
    #[must_use]
    pub fn finish_service(
        &self,
    ) -> FinishService<InMemoryWorkItemTracking, InMemoryGitRemote, UnusedLocalGit> {
        FinishService::new(
            Arc::new(self.work_items.clone()),
            Arc::new(self.git.clone()),
            Arc::new(UnusedLocalGit),
        )
    }

    /// Builds a url-mode start request.
    #[must_use]
    pub fn start_request(&self, work_item_id: u64) -> StartRequest {
        StartRequest {
            work_item_id,
            repo: Some(self.repo_url()),
            default_repo: None,
            base: None,
        }
    }

    /// Builds a url-mode finish request.
    #[must_use]
    pub fn finish_request(&self, work_item_id: u64) -> FinishRequest {
        FinishRequest {
            work_item_id,
            repo: Some(self.repo_url()),
            default_repo: None,
            target: None,
            draft: false,
        }
    }
}

impl Default for StartFinishWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> StartFinishWorld {
    StartFinishWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
