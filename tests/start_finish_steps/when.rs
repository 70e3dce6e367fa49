//! When steps for start/finish lifecycle BDD scenarios.

use rstest_bdd_macros::when;

use super::world::{StartFinishWorld, run_async};

#[when(r#"the start workflow runs for work item #{id:u64}"#)]
fn run_start(world: &mut StartFinishWorld, id: u64) {
    let service = world.start_service();
    let request = world.start_request(id);
    let credentials = world.credentials.clone();
    let outcome = run_async(service.execute(&credentials, &request));
    world.start_outcome = Some(outcome);
}

#[when(r#"the finish workflow runs for work item #{id:u64}"#)]
fn run_finish(world: &mut StartFinishWorld, id: u64) {
    let service = world.finish_service();
    let request = world.finish_request(id);
    let credentials = world.credentials.clone();
    let outcome = run_async(service.execute(&credentials, &request));
    world.finish_outcome = Some(outcome);
}
