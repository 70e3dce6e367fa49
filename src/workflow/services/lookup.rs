//! Shared work-item and repository lookups used by both workflows.

use tracing::debug;

use crate::repo::domain::RepoTarget;
use crate::workflow::domain::{WORK_ITEM_FIELDS, WorkItem, WorkItemId};
use crate::workflow::ports::{GitRemote, RepositoryInfo, WorkItemTracking};

use super::WorkflowError;

/// Fetches a work item and validates its required fields.
pub(crate) async fn fetch_work_item<W>(
    work_items: &W,
    id: WorkItemId,
) -> Result<WorkItem, WorkflowError>
where
    W: WorkItemTracking,
{
    let payload = work_items
        .work_item(id, &WORK_ITEM_FIELDS)
        .await?
        .ok_or(WorkflowError::WorkItemNotFound(id))?;
    let work_item = WorkItem::from_fields(id, &payload.fields)?;
    debug!(
        work_item = %id,
        title = work_item.title(),
        state = work_item.state(),
        "fetched work item"
    );
    Ok(work_item)
}

/// Resolves repository metadata for a target.
///
/// Project-qualified targets use a direct lookup. A bare repository name is
/// searched organization-wide and must match exactly one repository; when
/// several projects contain a repository with that name the caller must
/// disambiguate with a project-qualified URL or a local path.
pub(crate) async fn resolve_repository<G>(
    git: &G,
    target: &RepoTarget,
) -> Result<RepositoryInfo, WorkflowError>
where
    G: GitRemote,
{
    if let Some(project) = target.project() {
        return git
            .repository(target.repository(), project)
            .await?
            .ok_or_else(|| WorkflowError::RepositoryNotFound {
                repository: target.repository().to_owned(),
                project: Some(project.to_owned()),
            });
    }

    let all = git.repositories().await?;
    let mut matches: Vec<RepositoryInfo> = all
        .into_iter()
        .filter(|repository| repository.name.eq_ignore_ascii_case(target.repository()))
        .collect();

    match matches.len() {
        0 => Err(WorkflowError::RepositoryNotFound {
            repository: target.repository().to_owned(),
            project: None,
        }),
        1 => matches.pop().ok_or_else(|| {
            WorkflowError::RepositoryNotFound {
                repository: target.repository().to_owned(),
                project: None,
            }
        }),
        _ => {
            let mut projects: Vec<String> = matches
                .iter()
                .map(|repository| repository.project.name.clone())
                .collect();
            projects.sort();
            Err(WorkflowError::AmbiguousRepository {
                repository: target.repository().to_owned(),
                projects,
            })
        }
    }
}
