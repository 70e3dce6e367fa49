//! Shared fixtures for workflow service tests.

use uuid::Uuid;

use crate::auth::domain::{CredentialSource, OrganizationUrl, ResolvedCredentials};
use crate::workflow::adapters::memory::{InMemoryGitRemote, InMemoryWorkItemTracking};
use crate::workflow::ports::{ProjectRef, RepositoryId, RepositoryInfo};

/// Object id the seeded `main` branch points at.
pub(crate) const MAIN_OBJECT_ID: &str = "1111111111111111111111111111111111111111";

/// URL-mode repo flag matching [`repository`].
pub(crate) const REPO_URL: &str = "https://dev.azure.com/myorg/Platform/_git/billing";

/// Credentials for the `myorg` organization.
pub(crate) fn credentials() -> ResolvedCredentials {
    ResolvedCredentials::new(
        "myorg".to_owned(),
        OrganizationUrl::normalize("myorg").expect("organization should normalize"),
        "test-token".to_owned(),
        CredentialSource::Flag,
        CredentialSource::Env,
    )
}

/// A repository named `billing` in project `Platform` with ids.
pub(crate) fn repository() -> RepositoryInfo {
    RepositoryInfo {
        id: RepositoryId::from_uuid(Uuid::from_u128(0x1234_5678_9abc_def0)),
        name: "billing".to_owned(),
        project: ProjectRef {
            id: Some(Uuid::from_u128(0xfeed_beef_cafe)),
            name: "Platform".to_owned(),
        },
        default_branch: Some("refs/heads/main".to_owned()),
        remote_url: Some(REPO_URL.to_owned()),
        ssh_url: None,
    }
}

/// Seeded remote: the repository plus its `main` branch.
pub(crate) fn seeded_remote() -> (InMemoryGitRemote, RepositoryInfo) {
    let git = InMemoryGitRemote::new();
    let repo = repository();
    git.add_repository(repo.clone());
    git.add_ref(&repo, "refs/heads/main", MAIN_OBJECT_ID);
    (git, repo)
}

/// Work-item store seeded with one product-backlog item.
pub(crate) fn seeded_work_items(id: u64, title: &str, work_item_type: &str) -> InMemoryWorkItemTracking {
    let work_items = InMemoryWorkItemTracking::new();
    work_items.insert_work_item(id, title, work_item_type, "Platform", "Approved");
    work_items
}
