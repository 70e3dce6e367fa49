//! Start workflow: create a branch for a work item and mark it committed.

use std::sync::Arc;

use tracing::info;

use crate::auth::domain::ResolvedCredentials;
use crate::repo::domain::RepoTarget;
use crate::repo::ports::LocalGit;
use crate::repo::services::RepoTargetResolver;
use crate::workflow::domain::{
    BranchRef, ExecutionResult, PartialArtifact, STATE_COMMITTED, WorkItemId, branch_name,
};
use crate::workflow::ports::{
    GitRemote, ObjectId, PatchOperation, RefCreateError, RepositoryInfo, WorkItemTracking,
};

use super::lookup::{fetch_work_item, resolve_repository};
use super::refs::{requested_short_name, resolve_existing_ref, sample_branch_names};
use super::{RelationLinker, WorkflowError};

/// Work-item state field reference name.
const STATE_FIELD: &str = "System.State";

/// Caller inputs for the start workflow.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    /// Work item to start.
    pub work_item_id: u64,
    /// `--repo` flag value.
    pub repo: Option<String>,
    /// Configured default repository.
    pub default_repo: Option<String>,
    /// `--base` flag value.
    pub base: Option<String>,
}

/// Result payload of a fully successful start workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    /// Work item that was started.
    pub work_item_id: WorkItemId,
    /// Title of the work item.
    pub work_item_title: String,
    /// Short name of the created branch.
    pub branch_name: String,
    /// Canonical ref of the created branch.
    pub branch_ref: BranchRef,
    /// Repository path as `project/name`.
    pub repository_path: String,
    /// Clone URL to suggest in next steps.
    pub clone_url: String,
    /// Warning from the best-effort relation link, when degraded.
    pub link_warning: Option<String>,
    /// The resolved repository target.
    pub repo_target: RepoTarget,
}

/// Orchestrates branch creation for a work item.
#[derive(Clone)]
pub struct StartService<W, G, L>
where
    W: WorkItemTracking,
    G: GitRemote,
    L: LocalGit,
{
    work_items: Arc<W>,
    git: Arc<G>,
    repo_resolver: RepoTargetResolver<L>,
    linker: RelationLinker<W>,
}

impl<W, G, L> StartService<W, G, L>
where
    W: WorkItemTracking,
    G: GitRemote,
    L: LocalGit,
{
    /// Creates a start service over the given ports.
    #[must_use]
    pub fn new(work_items: Arc<W>, git: Arc<G>, local_git: Arc<L>) -> Self {
        let linker = RelationLinker::new(Arc::clone(&work_items));
        Self {
            work_items,
            git,
            repo_resolver: RepoTargetResolver::new(local_git),
            linker,
        }
    }

    /// Runs the start workflow once.
    ///
    /// Creates the deterministic branch from a resolved base ref via a
    /// compare-and-swap ref update, links it to the work item on a
    /// best-effort basis, and advances the work-item state to `Committed`.
    /// A state-update failure after the branch exists yields a partial
    /// outcome carrying the branch name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when any step before branch creation fails,
    /// or when branch creation itself fails.
    pub async fn execute(
        &self,
        credentials: &ResolvedCredentials,
        request: &StartRequest,
    ) -> Result<ExecutionResult<StartReport>, WorkflowError> {
        let work_item_id = WorkItemId::new(request.work_item_id)?;
        let work_item = fetch_work_item(self.work_items.as_ref(), work_item_id).await?;

        let target = self
            .repo_resolver
            .resolve(
                request.repo.as_deref(),
                request.default_repo.as_deref(),
                credentials.organization_url(),
            )
            .await?;
        let repository = resolve_repository(self.git.as_ref(), &target).await?;

        let base = self.resolve_base(&repository, request.base.as_deref()).await?;

        let new_branch_name =
            branch_name(work_item.id(), work_item.title(), work_item.work_item_type());
        let branch_ref = BranchRef::normalize(&new_branch_name)?;

        self.create_branch(&repository, &branch_ref, &base.object_id)
            .await?;
        info!(branch = %branch_ref, repository = %repository.path(), "created branch");

        let link = self
            .linker
            .link_branch(&work_item, &repository, &branch_ref)
            .await;

        let state_patch = [PatchOperation::set_field(STATE_FIELD, STATE_COMMITTED)];
        if let Err(err) = self
            .work_items
            .update_work_item(work_item.id(), work_item.team_project(), &state_patch)
            .await
        {
            return Ok(ExecutionResult::Partial {
                artifact: PartialArtifact::Branch {
                    branch_name: new_branch_name.clone(),
                },
                reason: format!(
                    "branch '{new_branch_name}' was created, but updating work item {} state to '{STATE_COMMITTED}' failed: {err}",
                    work_item.id()
                ),
            });
        }

        let clone_url = repository
            .remote_url
            .clone()
            .or_else(|| repository.ssh_url.clone())
            .unwrap_or_else(|| target.original_input().to_owned());

        Ok(ExecutionResult::Completed(StartReport {
            work_item_id: work_item.id(),
            work_item_title: work_item.title().to_owned(),
            branch_name: new_branch_name,
            branch_ref,
            repository_path: repository.path(),
            clone_url,
            link_warning: link.warning,
            repo_target: target,
        }))
    }

    /// Resolves the base ref, failing with a branch-name hint when no
    /// candidate exists.
    async fn resolve_base(
        &self,
        repository: &RepositoryInfo,
        base_flag: Option<&str>,
    ) -> Result<super::refs::ResolvedRef, WorkflowError> {
        if let Some(resolved) =
            resolve_existing_ref(self.git.as_ref(), repository, base_flag).await?
        {
            return Ok(resolved);
        }

        let available = sample_branch_names(self.git.as_ref(), repository)
            .await
            .unwrap_or_default();
        Err(WorkflowError::BaseBranchNotFound {
            requested: requested_short_name(base_flag, repository),
            repository: repository.name.clone(),
            available,
        })
    }

    /// Creates the branch via CAS and classifies rejection reasons.
    async fn create_branch(
        &self,
        repository: &RepositoryInfo,
        branch_ref: &BranchRef,
        base_object_id: &ObjectId,
    ) -> Result<(), WorkflowError> {
        self.git
            .create_ref(repository, branch_ref, &ObjectId::zero(), base_object_id)
            .await
            .map_err(|err| match err {
                RefCreateError::NameConflict => WorkflowError::BranchExists {
                    branch: branch_ref.short_name().to_owned(),
                    repository: repository.path(),
                },
                RefCreateError::PermissionDenied => WorkflowError::InsufficientScope(
                    "the personal access token is missing permission to create branches. Ensure it has Code (Read & write) scope"
                        .to_owned(),
                ),
                RefCreateError::Rejected(detail) => WorkflowError::BranchCreationFailed {
                    branch: branch_ref.short_name().to_owned(),
                    detail,
                },
                RefCreateError::Remote(remote) => WorkflowError::Remote(remote),
            })
    }
}
