//! Tests for idempotent relation linking.

use std::sync::Arc;

use rstest::{fixture, rstest};

use crate::workflow::adapters::memory::InMemoryWorkItemTracking;
use crate::workflow::domain::{
    BranchRef, PullRequestId, PullRequestInfo, WorkItem, WorkItemId,
};
use crate::workflow::ports::ProjectRef;
use crate::workflow::services::RelationLinker;

use super::support;

#[fixture]
fn work_items() -> InMemoryWorkItemTracking {
    support::seeded_work_items(77, "Improve onboarding", "Product Backlog Item")
}

fn snapshot() -> WorkItem {
    let id = WorkItemId::new(77).expect("id should be valid");
    let map = [
        ("System.Title", "Improve onboarding"),
        ("System.WorkItemType", "Product Backlog Item"),
        ("System.TeamProject", "Platform"),
        ("System.State", "Approved"),
    ]
    .iter()
    .map(|(key, value)| ((*key).to_owned(), serde_json::Value::from(*value)))
    .collect();
    WorkItem::from_fields(id, &map).expect("fields are complete")
}

fn pull_request(artifact_id: Option<&str>) -> PullRequestInfo {
    PullRequestInfo::new(
        PullRequestId::new(42).expect("id should be valid"),
        "https://dev.azure.com/myorg/Platform/_git/billing/pullrequest/42".to_owned(),
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize"),
        BranchRef::normalize("main").expect("ref should normalize"),
        false,
        artifact_id.map(str::to_owned),
    )
}

#[rstest]
#[tokio::test]
async fn branch_link_is_created_with_canonical_artifact_uri(work_items: InMemoryWorkItemTracking) {
    let repository = support::repository();
    let project_id = repository.project.id.expect("fixture has a project id");
    let linker = RelationLinker::new(Arc::new(work_items.clone()));
    let branch_ref =
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize");

    let outcome = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;

    assert!(outcome.linked);
    assert!(outcome.warning.is_none());

    let relations = work_items.relations_of(77);
    assert_eq!(relations.len(), 1);
    let relation = relations.first().expect("one relation should exist");
    assert_eq!(relation.rel, "ArtifactLink");
    assert_eq!(
        relation.url,
        format!(
            "vstfs:///Git/Ref/{project_id}%2F{}%2FGBfeature%2F77-improve-onboarding",
            repository.id
        )
    );
}

#[rstest]
#[tokio::test]
async fn existing_link_is_not_duplicated(work_items: InMemoryWorkItemTracking) {
    let repository = support::repository();
    let linker = RelationLinker::new(Arc::new(work_items.clone()));
    let branch_ref =
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize");

    let first = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;
    assert!(first.linked);

    let second = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;
    assert!(second.linked);
    assert!(second.warning.is_none());
    assert_eq!(work_items.relations_of(77).len(), 1);
}

#[rstest]
#[tokio::test]
async fn existing_link_comparison_is_case_insensitive(work_items: InMemoryWorkItemTracking) {
    let repository = support::repository();
    let project_id = repository.project.id.expect("fixture has a project id");
    let uri = format!(
        "VSTFS:///GIT/REF/{project_id}%2F{}%2FGBFEATURE%2F77-IMPROVE-ONBOARDING",
        repository.id
    );
    work_items.seed_relation(77, "ArtifactLink", &uri);

    let linker = RelationLinker::new(Arc::new(work_items.clone()));
    let branch_ref =
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize");
    let outcome = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;

    assert!(outcome.linked);
    assert_eq!(work_items.relations_of(77).len(), 1);
}

#[rstest]
#[tokio::test]
async fn pull_request_link_prefers_server_artifact_id(work_items: InMemoryWorkItemTracking) {
    let repository = support::repository();
    let linker = RelationLinker::new(Arc::new(work_items.clone()));

    let outcome = linker
        .link_pull_request(
            &snapshot(),
            &repository,
            &pull_request(Some("vstfs:///Git/PullRequestId/custom/artifact/42")),
        )
        .await;

    assert!(outcome.linked);
    let relations = work_items.relations_of(77);
    assert_eq!(
        relations.first().map(|relation| relation.url.as_str()),
        Some("vstfs:///Git/PullRequestId/custom/artifact/42")
    );
}

#[rstest]
#[tokio::test]
async fn pull_request_link_builds_uri_from_project_and_repo_ids(
    work_items: InMemoryWorkItemTracking,
) {
    let repository = support::repository();
    let project_id = repository.project.id.expect("fixture has a project id");
    let linker = RelationLinker::new(Arc::new(work_items.clone()));

    let outcome = linker
        .link_pull_request(&snapshot(), &repository, &pull_request(None))
        .await;

    assert!(outcome.linked);
    let relations = work_items.relations_of(77);
    assert_eq!(
        relations.first().map(|relation| relation.url.as_str()),
        Some(format!("vstfs:///Git/PullRequestId/{project_id}/{}/42", repository.id).as_str())
    );
}

#[rstest]
#[tokio::test]
async fn missing_project_id_degrades_pull_request_link(work_items: InMemoryWorkItemTracking) {
    let mut repository = support::repository();
    repository.project = ProjectRef {
        id: None,
        name: "Platform".to_owned(),
    };
    let linker = RelationLinker::new(Arc::new(work_items.clone()));

    let outcome = linker
        .link_pull_request(&snapshot(), &repository, &pull_request(None))
        .await;

    assert!(!outcome.linked);
    assert!(outcome.warning.is_some());
    assert!(work_items.relations_of(77).is_empty());
}

#[rstest]
#[tokio::test]
async fn relation_read_failure_degrades_to_warning(work_items: InMemoryWorkItemTracking) {
    work_items.set_fail_relation_reads(true);
    let repository = support::repository();
    let linker = RelationLinker::new(Arc::new(work_items.clone()));
    let branch_ref =
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize");

    let outcome = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;

    assert!(!outcome.linked);
    assert!(outcome.warning.is_some());
}

#[rstest]
#[tokio::test]
async fn relation_patch_failure_degrades_to_warning(work_items: InMemoryWorkItemTracking) {
    work_items.set_fail_relation_patches(true);
    let repository = support::repository();
    let linker = RelationLinker::new(Arc::new(work_items.clone()));
    let branch_ref =
        BranchRef::normalize("feature/77-improve-onboarding").expect("ref should normalize");

    let outcome = linker
        .link_branch(&snapshot(), &repository, &branch_ref)
        .await;

    assert!(!outcome.linked);
    assert!(outcome.warning.is_some());
    assert!(work_items.relations_of(77).is_empty());
}
