//! Idempotent linking of branches and pull requests to work items.

use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

use crate::workflow::domain::{BranchRef, PullRequestInfo, WorkItem};
use crate::workflow::ports::{PatchOperation, RepositoryInfo, WorkItemTracking};

/// Characters kept verbatim when encoding artifact-URI components.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Relation display name for branch links.
const BRANCH_LINK_NAME: &str = "Branch";

/// Relation display name for pull-request links.
const PULL_REQUEST_LINK_NAME: &str = "Pull Request";

/// Outcome of a best-effort link attempt.
///
/// Linking never fails the surrounding workflow: the caller already holds a
/// valid branch or pull request, and that success must not be lost over a
/// cosmetic link failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Whether the relation exists after the attempt.
    pub linked: bool,
    /// Explanation when the relation could not be ensured.
    pub warning: Option<String>,
}

impl LinkOutcome {
    /// Outcome for an ensured relation.
    const fn linked() -> Self {
        Self {
            linked: true,
            warning: None,
        }
    }

    /// Outcome for a degraded attempt.
    fn degraded(warning: String) -> Self {
        warn!(warning = %warning, "relation linking degraded to a warning");
        Self {
            linked: false,
            warning: Some(warning),
        }
    }
}

/// Attaches artifact-link relations between work items and git artifacts.
#[derive(Clone)]
pub struct RelationLinker<W>
where
    W: WorkItemTracking,
{
    work_items: Arc<W>,
}

impl<W> RelationLinker<W>
where
    W: WorkItemTracking,
{
    /// Creates a linker using `work_items` for reads and patches.
    #[must_use]
    pub const fn new(work_items: Arc<W>) -> Self {
        Self { work_items }
    }

    /// Ensures an artifact link from the work item to a branch.
    pub async fn link_branch(
        &self,
        work_item: &WorkItem,
        repository: &RepositoryInfo,
        branch_ref: &BranchRef,
    ) -> LinkOutcome {
        let project_component = repository
            .project
            .id
            .map_or_else(|| work_item.team_project().to_owned(), |id| id.to_string());
        let artifact_uri =
            branch_artifact_uri(&project_component, &repository.id.to_string(), branch_ref);
        self.ensure_link(work_item, &artifact_uri, BRANCH_LINK_NAME)
            .await
    }

    /// Ensures an artifact link from the work item to a pull request.
    pub async fn link_pull_request(
        &self,
        work_item: &WorkItem,
        repository: &RepositoryInfo,
        pull_request: &PullRequestInfo,
    ) -> LinkOutcome {
        let artifact_uri = match pull_request.artifact_id() {
            Some(artifact_id) => artifact_id.to_owned(),
            None => match repository.project.id {
                Some(project_id) => pull_request_artifact_uri(
                    &project_id.to_string(),
                    &repository.id.to_string(),
                    pull_request.id().value(),
                ),
                None => {
                    return LinkOutcome::degraded(
                        "cannot build pull-request artifact URI because the project ID is unavailable"
                            .to_owned(),
                    );
                }
            },
        };
        self.ensure_link(work_item, &artifact_uri, PULL_REQUEST_LINK_NAME)
            .await
    }

    /// Checks for an existing relation and patches one in when absent.
    async fn ensure_link(
        &self,
        work_item: &WorkItem,
        artifact_uri: &str,
        link_name: &str,
    ) -> LinkOutcome {
        let relations = match self
            .work_items
            .work_item_relations(work_item.id(), work_item.team_project())
            .await
        {
            Ok(relations) => relations,
            Err(err) => {
                return LinkOutcome::degraded(format!(
                    "could not read existing work-item relations ({err})"
                ));
            }
        };

        if relations
            .iter()
            .any(|relation| relation.is_artifact_link_to(artifact_uri))
        {
            debug!(artifact_uri, "relation already present");
            return LinkOutcome::linked();
        }

        let patch = [PatchOperation::add_artifact_link(artifact_uri, link_name)];
        match self
            .work_items
            .update_work_item(work_item.id(), work_item.team_project(), &patch)
            .await
        {
            Ok(()) => LinkOutcome::linked(),
            Err(err) => LinkOutcome::degraded(format!(
                "could not attach explicit {} relation to work item ({err})",
                link_name.to_lowercase()
            )),
        }
    }
}

/// Builds the branch artifact URI
/// `vstfs:///Git/Ref/<project>%2F<repo>%2FGB<shortName>`.
fn branch_artifact_uri(project: &str, repository_id: &str, branch_ref: &BranchRef) -> String {
    let encoded_project = utf8_percent_encode(project, URI_COMPONENT);
    let encoded_repo = utf8_percent_encode(repository_id, URI_COMPONENT);
    let encoded_ref = utf8_percent_encode(branch_ref.short_name(), URI_COMPONENT);
    format!("vstfs:///Git/Ref/{encoded_project}%2F{encoded_repo}%2FGB{encoded_ref}")
}

/// Builds the pull-request artifact URI
/// `vstfs:///Git/PullRequestId/<project>/<repo>/<id>`.
fn pull_request_artifact_uri(project_id: &str, repository_id: &str, pull_request_id: u64) -> String {
    format!("vstfs:///Git/PullRequestId/{project_id}/{repository_id}/{pull_request_id}")
}
