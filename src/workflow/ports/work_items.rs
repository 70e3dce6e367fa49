//! Work-item tracking port.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::RemoteError;
use crate::workflow::domain::WorkItemId;

/// Relation type of artifact links.
pub(crate) const ARTIFACT_LINK_RELATION: &str = "ArtifactLink";

/// Raw work-item payload as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemPayload {
    /// Numeric work-item identifier.
    pub id: u64,
    /// Raw field map keyed by reference name.
    pub fields: Map<String, Value>,
}

/// A single relation attached to a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Relation type, e.g. `ArtifactLink`.
    pub rel: String,
    /// Relation target URL or artifact URI.
    pub url: String,
}

impl Relation {
    /// Reports whether this is an artifact link to `artifact_uri`
    /// (case-insensitive).
    #[must_use]
    pub fn is_artifact_link_to(&self, artifact_uri: &str) -> bool {
        self.rel == ARTIFACT_LINK_RELATION && self.url.eq_ignore_ascii_case(artifact_uri)
    }
}

/// One JSON-patch operation applied to a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOperation {
    /// Patch operation verb.
    pub op: String,
    /// JSON-pointer style target path.
    pub path: String,
    /// Operation payload.
    pub value: Value,
}

impl PatchOperation {
    /// Builds an `add` operation setting a work-item field.
    #[must_use]
    pub fn set_field(field: &str, value: &str) -> Self {
        Self {
            op: "add".to_owned(),
            path: format!("/fields/{field}"),
            value: Value::String(value.to_owned()),
        }
    }

    /// Builds an `add` operation appending an artifact-link relation.
    #[must_use]
    pub fn add_artifact_link(artifact_uri: &str, link_name: &str) -> Self {
        Self {
            op: "add".to_owned(),
            path: "/relations/-".to_owned(),
            value: json!({
                "rel": ARTIFACT_LINK_RELATION,
                "url": artifact_uri,
                "attributes": { "name": link_name }
            }),
        }
    }
}

/// Contract for the work-item tracking operations the workflows need.
#[async_trait]
pub trait WorkItemTracking: Send + Sync {
    /// Fetches a work item restricted to `fields`.
    ///
    /// Returns `None` when the work item does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be reached or
    /// answers unexpectedly.
    async fn work_item(
        &self,
        id: WorkItemId,
        fields: &[&str],
    ) -> Result<Option<WorkItemPayload>, RemoteError>;

    /// Applies JSON-patch operations to a work item.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the patch is rejected.
    async fn update_work_item(
        &self,
        id: WorkItemId,
        project: &str,
        operations: &[PatchOperation],
    ) -> Result<(), RemoteError>;

    /// Fetches the work item's existing relations.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be reached or
    /// answers unexpectedly.
    async fn work_item_relations(
        &self,
        id: WorkItemId,
        project: &str,
    ) -> Result<Vec<Relation>, RemoteError>;

    /// Runs a WIQL query and returns matching work-item identifiers.
    ///
    /// Consumed only by listing features outside the orchestration core.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the query is rejected.
    async fn query_work_item_ids(
        &self,
        wiql: &str,
        project: Option<&str>,
        limit: u32,
    ) -> Result<Vec<WorkItemId>, RemoteError>;
}
