//! Tests for the repository-target resolution service.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::auth::domain::OrganizationUrl;
use crate::repo::domain::{RepoMode, RepoSource, RepoTargetError};
use crate::repo::ports::MockLocalGit;
use crate::repo::services::{RepoResolutionError, RepoTargetResolver};

#[fixture]
fn org_url() -> OrganizationUrl {
    OrganizationUrl::normalize("myorg").expect("organization should normalize")
}

fn resolver_with(mock: MockLocalGit) -> RepoTargetResolver<MockLocalGit> {
    RepoTargetResolver::new(Arc::new(mock))
}

#[rstest]
#[tokio::test]
async fn url_flag_resolves_without_touching_local_git(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let target = service
        .resolve(
            Some("https://dev.azure.com/myorg/Platform/_git/billing"),
            Some("ignored-default"),
            &org_url,
        )
        .await
        .expect("resolution should succeed");

    assert_eq!(target.mode(), RepoMode::Url);
    assert_eq!(target.source(), RepoSource::Flag);
    assert_eq!(target.organization(), "myorg");
    assert_eq!(target.project(), Some("Platform"));
    assert_eq!(target.repository(), "billing");
    assert!(target.local_path().is_none());
}

#[rstest]
#[tokio::test]
async fn config_default_is_used_when_flag_is_absent(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let target = service
        .resolve(None, Some("https://dev.azure.com/myorg/_git/app"), &org_url)
        .await
        .expect("resolution should succeed");

    assert_eq!(target.source(), RepoSource::Config);
    assert_eq!(target.project(), None);
    assert_eq!(target.repository(), "app");
}

#[rstest]
#[tokio::test]
async fn missing_identifier_is_rejected(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let result = service.resolve(None, None, &org_url).await;
    assert_eq!(result.unwrap_err(), RepoResolutionError::NotConfigured);
}

#[rstest]
#[tokio::test]
async fn organization_mismatch_is_a_hard_error(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let result = service
        .resolve(
            Some("https://dev.azure.com/otherorg/_git/app"),
            None,
            &org_url,
        )
        .await;

    assert_eq!(
        result.unwrap_err(),
        RepoResolutionError::OrgMismatch {
            found: "otherorg".to_owned(),
            expected: "myorg".to_owned(),
        }
    );
}

#[rstest]
#[tokio::test]
async fn organization_match_is_case_insensitive(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let target = service
        .resolve(Some("https://dev.azure.com/MyOrg/_git/app"), None, &org_url)
        .await
        .expect("resolution should succeed");

    assert_eq!(target.organization(), "MyOrg");
}

#[rstest]
#[tokio::test]
async fn local_path_resolves_through_origin_remote(org_url: OrganizationUrl) {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let raw_path = dir.path().to_str().expect("path should be UTF-8").to_owned();

    let mut mock = MockLocalGit::new();
    mock.expect_is_work_tree().return_const(Ok(true));
    mock.expect_origin_remote_url()
        .return_const(Ok("git@ssh.dev.azure.com:v3/myorg/Platform/billing".to_owned()));

    let service = resolver_with(mock);
    let target = service
        .resolve(Some(&raw_path), None, &org_url)
        .await
        .expect("resolution should succeed");

    assert_eq!(target.mode(), RepoMode::Path);
    assert_eq!(target.organization(), "myorg");
    assert_eq!(target.project(), Some("Platform"));
    assert_eq!(target.repository(), "billing");
    assert!(target.local_path().is_some());
}

#[rstest]
#[tokio::test]
async fn missing_path_is_rejected(org_url: OrganizationUrl) {
    let service = resolver_with(MockLocalGit::new());

    let result = service
        .resolve(Some("/definitely/not/here"), None, &org_url)
        .await;

    assert!(matches!(
        result,
        Err(RepoResolutionError::PathNotFound(_))
    ));
}

#[rstest]
#[tokio::test]
async fn non_work_tree_path_is_rejected(org_url: OrganizationUrl) {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let raw_path = dir.path().to_str().expect("path should be UTF-8").to_owned();

    let mut mock = MockLocalGit::new();
    mock.expect_is_work_tree().return_const(Ok(false));

    let service = resolver_with(mock);
    let result = service.resolve(Some(&raw_path), None, &org_url).await;

    assert!(matches!(
        result,
        Err(RepoResolutionError::NotAGitRepository(_))
    ));
}

#[rstest]
#[tokio::test]
async fn non_azure_origin_remote_is_rejected(org_url: OrganizationUrl) {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let raw_path = dir.path().to_str().expect("path should be UTF-8").to_owned();

    let mut mock = MockLocalGit::new();
    mock.expect_is_work_tree().return_const(Ok(true));
    mock.expect_origin_remote_url()
        .return_const(Ok("https://github.com/owner/repo".to_owned()));

    let service = resolver_with(mock);
    let result = service.resolve(Some(&raw_path), None, &org_url).await;

    assert!(matches!(
        result,
        Err(RepoResolutionError::Target(
            RepoTargetError::UnsupportedRemote(_)
        ))
    ));
}
