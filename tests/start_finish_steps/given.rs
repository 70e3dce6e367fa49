//! Given steps for start/finish lifecycle BDD scenarios.

use eyre::OptionExt;
use rstest_bdd_macros::given;

use super::world::{SEED_OBJECT_ID, StartFinishWorld};

#[given(r#"a work item #{id:u64} titled "{title}" of type "{work_item_type}""#)]
fn seeded_work_item(world: &mut StartFinishWorld, id: u64, title: String, work_item_type: String) {
    world
        .work_items
        .insert_work_item(id, &title, &work_item_type, "Platform", "Approved");
}

#[given(r#"a repository "{name}" in project "{project}" with default branch "{branch}""#)]
fn seeded_repository(world: &mut StartFinishWorld, name: String, project: String, branch: String) {
    world.add_repository(&name, &project, &branch);
}

#[given("work item state updates are failing")]
fn failing_state_updates(world: &mut StartFinishWorld) {
    world.work_items.set_fail_state_updates(true);
}

#[given(r#"a remote branch "{name}""#)]
fn seeded_remote_branch(world: &mut StartFinishWorld, name: String) -> Result<(), eyre::Report> {
    let repository = world
        .repository
        .as_ref()
        .ok_or_eyre("scenario must register a repository before branches")?;
    world
        .git
        .add_ref(repository, &format!("refs/heads/{name}"), SEED_OBJECT_ID);
    Ok(())
}

#[given(r#"an active pull request #{id:u64} from "{source}" into "{target}""#)]
fn seeded_pull_request(
    world: &mut StartFinishWorld,
    id: u64,
    source: String,
    target: String,
) -> Result<(), eyre::Report> {
    let repository = world
        .repository
        .as_ref()
        .ok_or_eyre("scenario must register a repository before pull requests")?;
    world.git.seed_pull_request(
        repository,
        id,
        &format!("refs/heads/{source}"),
        &format!("refs/heads/{target}"),
        false,
        None,
    );
    Ok(())
}
