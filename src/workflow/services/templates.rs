//! Rendering of pull-request text from work-item metadata.

use minijinja::{Environment, context};

use crate::workflow::domain::WorkItem;

use super::WorkflowError;

/// Title template for handoff pull requests.
const PR_TITLE_TEMPLATE: &str = "WI {{ id }}: {{ title }}";

/// Fixed description template for handoff pull requests.
const PR_DESCRIPTION_TEMPLATE: &str =
    "Automated handoff for work item {{ id }} ({{ work_item_type }}).";

/// Renders the pull-request title for a work item.
pub(crate) fn pull_request_title(work_item: &WorkItem) -> Result<String, WorkflowError> {
    render(PR_TITLE_TEMPLATE, work_item)
}

/// Renders the pull-request description for a work item.
pub(crate) fn pull_request_description(work_item: &WorkItem) -> Result<String, WorkflowError> {
    render(PR_DESCRIPTION_TEMPLATE, work_item)
}

/// Renders a template against the work-item context.
fn render(template: &str, work_item: &WorkItem) -> Result<String, WorkflowError> {
    let env = Environment::new();
    env.render_str(
        template,
        context! {
            id => work_item.id().value(),
            title => work_item.title(),
            work_item_type => work_item.work_item_type(),
        },
    )
    .map_err(|err| WorkflowError::Template(err.to_string()))
}
