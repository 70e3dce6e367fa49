//! Ordered-candidate resolution of base and target branches.

use crate::workflow::domain::{BranchRef, WorkflowDomainError};
use crate::workflow::ports::{GitRemote, ObjectId, RemoteError, RepositoryInfo};

use super::WorkflowError;

/// How many existing branch names to include in a not-found hint.
const AVAILABLE_BRANCH_SAMPLE: usize = 10;

/// A candidate ref that exists remotely.
pub(crate) struct ResolvedRef {
    /// Canonical ref.
    pub branch_ref: BranchRef,
    /// Object id the ref points at.
    pub object_id: ObjectId,
}

/// Builds the ordered, deduplicated candidate list: the explicit flag value,
/// the repository default branch, then `main` and `master`.
fn candidate_refs(
    explicit: Option<&str>,
    repository: &RepositoryInfo,
) -> Result<Vec<BranchRef>, WorkflowDomainError> {
    let mut candidates: Vec<BranchRef> = Vec::new();
    if let Some(value) = explicit {
        candidates.push(BranchRef::normalize(value)?);
    }
    if let Some(default_branch) = repository.default_branch.as_deref() {
        candidates.push(BranchRef::normalize(default_branch)?);
    }
    for fallback in ["refs/heads/main", "refs/heads/master"] {
        candidates.push(BranchRef::normalize(fallback)?);
    }
    let mut unique: Vec<BranchRef> = Vec::new();
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    Ok(unique)
}

/// Resolves the first candidate that exists remotely, together with its
/// object id.
///
/// Existence requires an exact case-insensitive full-ref-name match with a
/// known object id among the refs listed under the candidate's short name.
pub(crate) async fn resolve_existing_ref<G>(
    git: &G,
    repository: &RepositoryInfo,
    explicit: Option<&str>,
) -> Result<Option<ResolvedRef>, WorkflowError>
where
    G: GitRemote,
{
    for candidate in candidate_refs(explicit, repository)? {
        let refs = git.refs(repository, candidate.api_filter()).await?;
        let matched = refs
            .into_iter()
            .find(|remote_ref| candidate.matches_name_ignore_case(&remote_ref.name));
        if let Some(remote_ref) = matched {
            return Ok(Some(ResolvedRef {
                branch_ref: candidate,
                object_id: remote_ref.object_id,
            }));
        }
    }
    Ok(None)
}

/// Returns up to ten existing short branch names as a hint.
pub(crate) async fn sample_branch_names<G>(
    git: &G,
    repository: &RepositoryInfo,
) -> Result<Vec<String>, RemoteError>
where
    G: GitRemote,
{
    let refs = git.refs(repository, "heads/").await?;
    Ok(refs
        .into_iter()
        .map(|remote_ref| short_ref_name(&remote_ref.name))
        .take(AVAILABLE_BRANCH_SAMPLE)
        .collect())
}

/// Returns the short display name a failed resolution asked for.
pub(crate) fn requested_short_name(explicit: Option<&str>, repository: &RepositoryInfo) -> String {
    let requested = explicit
        .or(repository.default_branch.as_deref())
        .unwrap_or("main");
    short_ref_name(requested)
}

/// Strips the `refs/heads/` prefix from a ref name.
pub(crate) fn short_ref_name(name: &str) -> String {
    name.strip_prefix("refs/heads/").unwrap_or(name).to_owned()
}
