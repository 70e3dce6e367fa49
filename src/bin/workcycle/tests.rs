//! Tests for CLI argument validation and output shaping.

use rstest::rstest;

use workcycle::repo::domain::{RepoSource, RepoTarget, RepoTargetError};
use workcycle::workflow::domain::{BranchRef, WorkItemId};

use super::{StartReport, start_next_steps, validate_repo_value};

#[rstest]
fn repo_value_keeps_valid_urls() {
    let validated = validate_repo_value(" https://dev.azure.com/myorg/Proj/_git/app ")
        .expect("value should validate");
    assert_eq!(validated, "https://dev.azure.com/myorg/Proj/_git/app");
}

#[rstest]
fn repo_value_rejects_unsupported_urls() {
    let result = validate_repo_value("https://github.com/owner/repo");
    assert!(matches!(result, Err(RepoTargetError::UnsupportedRemote(_))));
}

#[rstest]
fn repo_value_rejects_blank_input() {
    assert!(matches!(
        validate_repo_value("   "),
        Err(RepoTargetError::EmptyIdentifier)
    ));
}

#[rstest]
fn repo_value_defers_local_path_validation() {
    let validated = validate_repo_value("../some/checkout").expect("paths pass through");
    assert_eq!(validated, "../some/checkout");
}

fn url_mode_report() -> StartReport {
    StartReport {
        work_item_id: WorkItemId::new(77).expect("id should be valid"),
        work_item_title: "Improve onboarding".to_owned(),
        branch_name: "feature/77-improve-onboarding".to_owned(),
        branch_ref: BranchRef::normalize("feature/77-improve-onboarding")
            .expect("ref should normalize"),
        repository_path: "Platform/billing".to_owned(),
        clone_url: "https://dev.azure.com/myorg/Platform/_git/billing".to_owned(),
        link_warning: None,
        repo_target: RepoTarget::from_url(
            RepoSource::Flag,
            "https://dev.azure.com/myorg/Platform/_git/billing".to_owned(),
            "myorg".to_owned(),
            Some("Platform".to_owned()),
            "billing".to_owned(),
        ),
    }
}

#[rstest]
fn url_mode_suggests_a_single_clone_command() {
    let steps = start_next_steps(&url_mode_report());
    assert_eq!(steps.len(), 1);
    let clone = steps.first().expect("one step should exist");
    assert!(clone.contains("git clone --single-branch"));
    assert!(clone.contains("feature/77-improve-onboarding"));
}

#[rstest]
fn path_mode_suggests_fetch_and_checkout() {
    let mut report = url_mode_report();
    report.repo_target = RepoTarget::from_local(
        RepoSource::Config,
        "../billing".to_owned(),
        "myorg".to_owned(),
        Some("Platform".to_owned()),
        "billing".to_owned(),
        camino::Utf8PathBuf::from("/home/dev/billing"),
    );

    let steps = start_next_steps(&report);
    assert_eq!(steps.len(), 2);
    assert!(steps.first().expect("two steps").contains("fetch origin"));
    assert!(steps.get(1).expect("two steps").contains("checkout -b"));
}
