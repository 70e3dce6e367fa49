//! Finish workflow: hand a work-item branch off as a pull request.

use std::collections::BTreeSet;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use crate::auth::domain::ResolvedCredentials;
use crate::repo::domain::{RepoMode, RepoTarget};
use crate::repo::ports::LocalGit;
use crate::repo::services::RepoTargetResolver;
use crate::workflow::domain::{
    BranchRef, ExecutionResult, PartialArtifact, PullRequestAction, PullRequestId,
    PullRequestInfo, STATE_IN_REVIEW, WorkItem, WorkItemId, branch_matches_work_item,
};
use crate::workflow::ports::{
    CreatePullRequest, GitRemote, PatchOperation, PullRequestPayload, RepositoryInfo,
    WorkItemTracking,
};

use super::lookup::{fetch_work_item, resolve_repository};
use super::refs::{requested_short_name, resolve_existing_ref, short_ref_name};
use super::{RelationLinker, WorkflowError, templates};

/// Work-item state field reference name.
const STATE_FIELD: &str = "System.State";

/// Characters kept verbatim when encoding URL path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Caller inputs for the finish workflow.
#[derive(Debug, Clone, Default)]
pub struct FinishRequest {
    /// Work item to finish.
    pub work_item_id: u64,
    /// `--repo` flag value.
    pub repo: Option<String>,
    /// Configured default repository.
    pub default_repo: Option<String>,
    /// `--target` flag value.
    pub target: Option<String>,
    /// Create the pull request as a draft when a new one is created.
    pub draft: bool,
}

/// Result payload of a fully successful finish workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishReport {
    /// Work item that was finished.
    pub work_item_id: WorkItemId,
    /// Title of the work item.
    pub work_item_title: String,
    /// Repository path as `project/name`.
    pub repository_path: String,
    /// Resolved source ref.
    pub source_ref: BranchRef,
    /// Resolved target ref.
    pub target_ref: BranchRef,
    /// The created or reused pull request.
    pub pull_request: PullRequestInfo,
    /// Whether the pull request was created or reused.
    pub action: PullRequestAction,
    /// Warning from the best-effort relation link, when degraded.
    pub relation_warning: Option<String>,
    /// Whether the local source branch was pushed first.
    pub source_was_pushed: bool,
    /// The resolved repository target.
    pub repo_target: RepoTarget,
}

/// Source-branch resolution result.
struct ResolvedSource {
    source_ref: BranchRef,
    source_was_pushed: bool,
}

/// Orchestrates pull-request handoff for a work item.
#[derive(Clone)]
pub struct FinishService<W, G, L>
where
    W: WorkItemTracking,
    G: GitRemote,
    L: LocalGit,
{
    work_items: Arc<W>,
    git: Arc<G>,
    local_git: Arc<L>,
    repo_resolver: RepoTargetResolver<L>,
    linker: RelationLinker<W>,
}

impl<W, G, L> FinishService<W, G, L>
where
    W: WorkItemTracking,
    G: GitRemote,
    L: LocalGit,
{
    /// Creates a finish service over the given ports.
    #[must_use]
    pub fn new(work_items: Arc<W>, git: Arc<G>, local_git: Arc<L>) -> Self {
        let linker = RelationLinker::new(Arc::clone(&work_items));
        Self {
            work_items,
            git,
            repo_resolver: RepoTargetResolver::new(Arc::clone(&local_git)),
            local_git,
            linker,
        }
    }

    /// Runs the finish workflow once.
    ///
    /// Resolves the source branch (from the local checkout in path mode,
    /// from remote branch listings in url mode), resolves the target
    /// branch, creates or reuses the pull request for the exact ref pair,
    /// links it to the work item on a best-effort basis, and advances the
    /// work-item state to `In Review`. A state-update failure after the
    /// pull request exists yields a partial outcome carrying the pull
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when any step before the pull request
    /// exists fails.
    pub async fn execute(
        &self,
        credentials: &ResolvedCredentials,
        request: &FinishRequest,
    ) -> Result<ExecutionResult<FinishReport>, WorkflowError> {
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

        let source = self
            .resolve_source(&target, &repository, work_item_id)
            .await?;
        let target_ref = self
            .resolve_target(&repository, request.target.as_deref())
            .await?;

        if source.source_ref.matches_ignore_case(&target_ref) {
            return Err(WorkflowError::SourceEqualsTarget {
                branch: source.source_ref.short_name().to_owned(),
            });
        }

        let (pull_request, action) = self
            .create_or_reuse_pull_request(
                credentials,
                &repository,
                &work_item,
                &source.source_ref,
                &target_ref,
                request.draft,
            )
            .await?;
        info!(
            pull_request = %pull_request.id(),
            action = %action,
            "pull request ready"
        );

        let link = self
            .linker
            .link_pull_request(&work_item, &repository, &pull_request)
            .await;

        let state_patch = [PatchOperation::set_field(STATE_FIELD, STATE_IN_REVIEW)];
        if let Err(err) = self
            .work_items
            .update_work_item(work_item.id(), work_item.team_project(), &state_patch)
            .await
        {
            let reason = format!(
                "pull request #{} is ready ({}), but updating work item {} state to '{STATE_IN_REVIEW}' failed: {err}",
                pull_request.id(),
                pull_request.url(),
                work_item.id()
            );
            return Ok(ExecutionResult::Partial {
                artifact: PartialArtifact::PullRequest(pull_request),
                reason,
            });
        }

        Ok(ExecutionResult::Completed(FinishReport {
            work_item_id: work_item.id(),
            work_item_title: work_item.title().to_owned(),
            repository_path: repository.path(),
            source_ref: source.source_ref,
            target_ref,
            pull_request,
            action,
            relation_warning: link.warning,
            source_was_pushed: source.source_was_pushed,
            repo_target: target,
        }))
    }

    /// Resolves the source branch according to the repository mode.
    async fn resolve_source(
        &self,
        target: &RepoTarget,
        repository: &RepositoryInfo,
        work_item_id: WorkItemId,
    ) -> Result<ResolvedSource, WorkflowError> {
        match target.mode() {
            RepoMode::Path => self.resolve_source_from_checkout(target, work_item_id).await,
            RepoMode::Url => {
                let source_ref = self
                    .resolve_source_from_remote(repository, work_item_id)
                    .await?;
                Ok(ResolvedSource {
                    source_ref,
                    source_was_pushed: false,
                })
            }
        }
    }

    /// Resolves the source branch from the local checkout, pushing it when
    /// it has no tracking branch or is ahead of its upstream.
    async fn resolve_source_from_checkout(
        &self,
        target: &RepoTarget,
        work_item_id: WorkItemId,
    ) -> Result<ResolvedSource, WorkflowError> {
        let local_path = target.local_path().ok_or_else(|| {
            WorkflowError::Validation(
                "local repository path is missing from the resolved repository target".to_owned(),
            )
        })?;

        let current_branch = self.local_git.current_branch(local_path).await?;
        if !branch_matches_work_item(&current_branch, work_item_id) {
            return Err(WorkflowError::SourceBranchMismatch {
                branch: current_branch,
                work_item: work_item_id,
            });
        }

        let mut pushed = false;
        if self
            .local_git
            .has_tracking_branch(local_path, &current_branch)
            .await?
        {
            if self.local_git.ahead_count(local_path, &current_branch).await? > 0 {
                self.local_git
                    .push_to_origin(local_path, &current_branch)
                    .await?;
                pushed = true;
            }
        } else {
            self.local_git
                .push_to_origin(local_path, &current_branch)
                .await?;
            pushed = true;
        }

        Ok(ResolvedSource {
            source_ref: BranchRef::normalize(&current_branch)?,
            source_was_pushed: pushed,
        })
    }

    /// Infers the source branch from remote listings under the work item's
    /// `bug/` and `feature/` prefixes.
    async fn resolve_source_from_remote(
        &self,
        repository: &RepositoryInfo,
        work_item_id: WorkItemId,
    ) -> Result<BranchRef, WorkflowError> {
        let tokens = [
            format!("bug/{work_item_id}"),
            format!("feature/{work_item_id}"),
        ];

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for token in &tokens {
            let refs = self.git.refs(repository, &format!("heads/{token}")).await?;
            for remote_ref in refs {
                let short = short_ref_name(&remote_ref.name);
                if tokens
                    .iter()
                    .any(|t| short == *t || short.starts_with(&format!("{t}-")))
                {
                    candidates.insert(short);
                }
            }
        }

        let mut sorted: Vec<String> = candidates.into_iter().collect();
        match sorted.len() {
            1 => {
                let only = sorted.pop().ok_or(WorkflowError::SourceBranchNotFound {
                    work_item: work_item_id,
                })?;
                Ok(BranchRef::normalize(&only)?)
            }
            0 => Err(WorkflowError::SourceBranchNotFound {
                work_item: work_item_id,
            }),
            _ => Err(WorkflowError::AmbiguousSourceBranch {
                work_item: work_item_id,
                candidates: sorted,
            }),
        }
    }

    /// Resolves the target branch with the ordered-candidate policy.
    async fn resolve_target(
        &self,
        repository: &RepositoryInfo,
        target_flag: Option<&str>,
    ) -> Result<BranchRef, WorkflowError> {
        resolve_existing_ref(self.git.as_ref(), repository, target_flag)
            .await?
            .map(|resolved| resolved.branch_ref)
            .ok_or_else(|| WorkflowError::TargetBranchNotFound {
                requested: requested_short_name(target_flag, repository),
                repository: repository.path(),
            })
    }

    /// Reuses the newest active pull request for the ref pair, creating one
    /// when none exists.
    async fn create_or_reuse_pull_request(
        &self,
        credentials: &ResolvedCredentials,
        repository: &RepositoryInfo,
        work_item: &WorkItem,
        source_ref: &BranchRef,
        target_ref: &BranchRef,
        draft: bool,
    ) -> Result<(PullRequestInfo, PullRequestAction), WorkflowError> {
        let active = self
            .git
            .pull_requests(repository, source_ref, target_ref)
            .await?;

        if let Some(latest) = select_latest(&active) {
            let info = payload_to_info(credentials, repository, latest, source_ref, target_ref)?;
            return Ok((info, PullRequestAction::Reused));
        }

        let created = self
            .git
            .create_pull_request(
                repository,
                &CreatePullRequest {
                    source_ref: source_ref.clone(),
                    target_ref: target_ref.clone(),
                    title: templates::pull_request_title(work_item)?,
                    description: templates::pull_request_description(work_item)?,
                    draft,
                },
            )
            .await?;
        let info = payload_to_info(credentials, repository, &created, source_ref, target_ref)?;
        Ok((info, PullRequestAction::Created))
    }
}

/// Validates a pull-request payload into reportable details.
fn payload_to_info(
    credentials: &ResolvedCredentials,
    repository: &RepositoryInfo,
    payload: &PullRequestPayload,
    source_ref: &BranchRef,
    target_ref: &BranchRef,
) -> Result<PullRequestInfo, WorkflowError> {
    let raw_id = payload.id.ok_or_else(|| {
        WorkflowError::Protocol("the service returned a pull request without an ID".to_owned())
    })?;
    let id = PullRequestId::new(raw_id)?;

    let url = payload
        .url
        .clone()
        .unwrap_or_else(|| browse_url(credentials.organization_url().as_str(), repository, id));

    Ok(PullRequestInfo::new(
        id,
        url,
        source_ref.clone(),
        target_ref.clone(),
        payload.is_draft == Some(true),
        payload.artifact_id.clone(),
    ))
}

/// Picks the pull request with the numerically highest id.
fn select_latest(pull_requests: &[PullRequestPayload]) -> Option<&PullRequestPayload> {
    pull_requests
        .iter()
        .filter(|payload| payload.id.is_some())
        .max_by_key(|payload| payload.id)
}

/// Builds a browsable pull-request URL from the organization endpoint.
fn browse_url(org_url: &str, repository: &RepositoryInfo, id: PullRequestId) -> String {
    let base = org_url.trim_end_matches('/');
    let project = utf8_percent_encode(&repository.project.name, PATH_SEGMENT);
    let name = utf8_percent_encode(&repository.name, PATH_SEGMENT);
    format!("{base}/{project}/_git/{name}/pullrequest/{id}")
}
