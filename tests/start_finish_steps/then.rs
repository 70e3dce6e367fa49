//! Then steps for start/finish lifecycle BDD scenarios.

use eyre::OptionExt;
use rstest_bdd_macros::then;

use workcycle::workflow::domain::{ExecutionResult, PartialArtifact, PullRequestAction};

use super::world::StartFinishWorld;

#[then(r#"the branch "{name}" exists in the repository"#)]
fn branch_exists(world: &StartFinishWorld, name: String) -> Result<(), eyre::Report> {
    let repository = world
        .repository
        .as_ref()
        .ok_or_eyre("scenario should have a repository")?;
    if !world.git.has_ref(repository, &format!("refs/heads/{name}")) {
        return Err(eyre::eyre!("expected branch '{name}' to exist"));
    }
    Ok(())
}

#[then(r#"the work item state is "{state}""#)]
fn work_item_state_is(world: &StartFinishWorld, state: String) -> Result<(), eyre::Report> {
    let id = world
        .start_outcome
        .as_ref()
        .and_then(|outcome| outcome.as_ref().ok())
        .and_then(|outcome| outcome.completed())
        .map(|report| report.work_item_id.value())
        .or_else(|| {
            world
                .finish_outcome
                .as_ref()
                .and_then(|outcome| outcome.as_ref().ok())
                .and_then(|outcome| outcome.completed())
                .map(|report| report.work_item_id.value())
        })
        .ok_or_eyre("scenario should have a completed outcome")?;

    let actual = world
        .work_items
        .field(id, "System.State")
        .ok_or_eyre("work item should exist")?;
    if actual != state {
        return Err(eyre::eyre!("expected state '{state}', got '{actual}'"));
    }
    Ok(())
}

#[then(r#"the outcome is partial and names branch "{name}""#)]
fn outcome_is_partial_with_branch(
    world: &StartFinishWorld,
    name: String,
) -> Result<(), eyre::Report> {
    let outcome = world
        .start_outcome
        .as_ref()
        .ok_or_eyre("start outcome should be recorded")?
        .as_ref()
        .map_err(|err| eyre::eyre!("start should not fail outright: {err}"))?;

    match outcome {
        ExecutionResult::Partial { artifact, reason } => match artifact {
            PartialArtifact::Branch { branch_name } if *branch_name == name => {
                if !reason.contains(&name) {
                    return Err(eyre::eyre!("partial reason should name the branch"));
                }
                Ok(())
            }
            other => Err(eyre::eyre!("unexpected partial artifact: {other:?}")),
        },
        ExecutionResult::Completed(_) => Err(eyre::eyre!("expected a partial outcome")),
    }
}

#[then(r#"pull request #{id:u64} is reused"#)]
fn pull_request_reused(world: &StartFinishWorld, id: u64) -> Result<(), eyre::Report> {
    let report = finish_report(world)?;
    if report.action != PullRequestAction::Reused {
        return Err(eyre::eyre!("expected a reused pull request"));
    }
    if report.pull_request.id().value() != id {
        return Err(eyre::eyre!(
            "expected pull request #{id}, got #{}",
            report.pull_request.id()
        ));
    }
    Ok(())
}

#[then(r#"a new pull request is created from "{source}" into "{target}""#)]
fn pull_request_created(
    world: &StartFinishWorld,
    source: String,
    target: String,
) -> Result<(), eyre::Report> {
    let report = finish_report(world)?;
    if report.action != PullRequestAction::Created {
        return Err(eyre::eyre!("expected a created pull request"));
    }
    if report.source_ref.short_name() != source {
        return Err(eyre::eyre!(
            "expected source '{source}', got '{}'",
            report.source_ref.short_name()
        ));
    }
    if report.target_ref.short_name() != target {
        return Err(eyre::eyre!(
            "expected target '{target}', got '{}'",
            report.target_ref.short_name()
        ));
    }
    Ok(())
}

/// Extracts the completed finish report from the world.
fn finish_report(
    world: &StartFinishWorld,
) -> Result<&workcycle::workflow::services::FinishReport, eyre::Report> {
    world
        .finish_outcome
        .as_ref()
        .ok_or_eyre("finish outcome should be recorded")?
        .as_ref()
        .map_err(|err| eyre::eyre!("finish should succeed: {err}"))?
        .completed()
        .ok_or_eyre("finish outcome should be complete")
}
