//! Work-item snapshot and identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::WorkflowDomainError;

/// Field reference name of the work-item title.
pub(crate) const FIELD_TITLE: &str = "System.Title";

/// Field reference name of the work-item type.
pub(crate) const FIELD_TYPE: &str = "System.WorkItemType";

/// Field reference name of the owning team project.
pub(crate) const FIELD_PROJECT: &str = "System.TeamProject";

/// Field reference name of the work-item state.
pub(crate) const FIELD_STATE: &str = "System.State";

/// Fields requested when fetching a work item for orchestration.
pub const WORK_ITEM_FIELDS: [&str; 5] = [
    "System.Id",
    FIELD_TITLE,
    FIELD_TYPE,
    FIELD_PROJECT,
    FIELD_STATE,
];

/// State a work item enters once a branch has been created for it.
pub const STATE_COMMITTED: &str = "Committed";

/// State a work item enters once its pull request is ready.
pub const STATE_IN_REVIEW: &str = "In Review";

/// Positive work-item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(u64);

impl WorkItemId {
    /// Creates a validated work-item identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidWorkItemId`] when the value is
    /// zero.
    pub const fn new(value: u64) -> Result<Self, WorkflowDomainError> {
        if value == 0 {
            return Err(WorkflowDomainError::InvalidWorkItemId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable work-item snapshot fetched once per orchestration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    id: WorkItemId,
    title: String,
    work_item_type: String,
    team_project: String,
    state: String,
}

impl WorkItem {
    /// Builds a snapshot from the raw field map returned by the remote
    /// service.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::MissingField`] when any required field
    /// is absent, not a string, or blank.
    pub fn from_fields(
        id: WorkItemId,
        fields: &Map<String, Value>,
    ) -> Result<Self, WorkflowDomainError> {
        Ok(Self {
            id,
            title: required_string(fields, FIELD_TITLE)?,
            work_item_type: required_string(fields, FIELD_TYPE)?,
            team_project: required_string(fields, FIELD_PROJECT)?,
            state: required_string(fields, FIELD_STATE)?,
        })
    }

    /// Returns the work-item identifier.
    #[must_use]
    pub const fn id(&self) -> WorkItemId {
        self.id
    }

    /// Returns the work-item title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the work-item type name.
    #[must_use]
    pub fn work_item_type(&self) -> &str {
        &self.work_item_type
    }

    /// Returns the owning team project.
    #[must_use]
    pub fn team_project(&self) -> &str {
        &self.team_project
    }

    /// Returns the state the work item had when fetched.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }
}

/// Extracts a required, trimmed, non-empty string field.
fn required_string(
    fields: &Map<String, Value>,
    field: &str,
) -> Result<String, WorkflowDomainError> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| WorkflowDomainError::MissingField(field.to_owned()))
}
