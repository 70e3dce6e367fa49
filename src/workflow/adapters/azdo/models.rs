//! Wire data shapes of the Azure DevOps REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard list envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ListResponse<T> {
    /// Listed items.
    #[serde(default)]
    pub value: Vec<T>,
}

/// Work item with raw fields and optional relations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkItemDto {
    pub id: Option<u64>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub relations: Option<Vec<RelationDto>>,
}

/// One work-item relation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelationDto {
    pub rel: Option<String>,
    pub url: Option<String>,
}

/// Repository metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepositoryDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project: Option<ProjectDto>,
    pub default_branch: Option<String>,
    pub remote_url: Option<String>,
    pub ssh_url: Option<String>,
}

/// Project metadata embedded in repository responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectDto {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One listed ref.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefDto {
    pub name: Option<String>,
    pub object_id: Option<String>,
}

/// One requested ref update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefUpdateRequestDto {
    pub name: String,
    pub old_object_id: String,
    pub new_object_id: String,
}

/// Result of one requested ref update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefUpdateResultDto {
    pub success: Option<bool>,
    pub update_status: Option<String>,
    pub custom_message: Option<String>,
}

/// Pull request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestDto {
    pub pull_request_id: Option<u64>,
    pub is_draft: Option<bool>,
    pub artifact_id: Option<String>,
    pub remote_url: Option<String>,
}

/// Pull request creation body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePullRequestDto {
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub title: String,
    pub description: String,
    pub is_draft: bool,
}

/// WIQL query body.
#[derive(Debug, Serialize)]
pub(crate) struct WiqlQueryDto {
    pub query: String,
}

/// WIQL query response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WiqlResultDto {
    #[serde(default)]
    pub work_items: Vec<WiqlWorkItemRefDto>,
}

/// One WIQL result row.
#[derive(Debug, Deserialize)]
pub(crate) struct WiqlWorkItemRefDto {
    pub id: Option<u64>,
}
