//! Work-item tracking over the Azure DevOps REST API.

use async_trait::async_trait;

use crate::workflow::domain::WorkItemId;
use crate::workflow::ports::{
    PatchOperation, Relation, RemoteError, WorkItemPayload, WorkItemTracking,
};

use super::AzureDevOpsClient;
use super::models::{WiqlQueryDto, WiqlResultDto, WorkItemDto};

#[async_trait]
impl WorkItemTracking for AzureDevOpsClient {
    async fn work_item(
        &self,
        id: WorkItemId,
        fields: &[&str],
    ) -> Result<Option<WorkItemPayload>, RemoteError> {
        let url = self.api_url(None, &format!("wit/workitems/{id}"));
        let request = self.get(&url).query(&[("fields", fields.join(","))]);
        let dto: Option<WorkItemDto> = self.send_json_optional(request).await?;

        dto.map(|work_item| {
            let raw_id = work_item
                .id
                .ok_or_else(|| RemoteError::Parse("work item response missing id".to_owned()))?;
            Ok(WorkItemPayload {
                id: raw_id,
                fields: work_item.fields,
            })
        })
        .transpose()
    }

    async fn update_work_item(
        &self,
        id: WorkItemId,
        project: &str,
        operations: &[PatchOperation],
    ) -> Result<(), RemoteError> {
        let url = self.api_url(Some(project), &format!("wit/workitems/{id}"));
        let request = self.patch(&url).json(operations);
        self.send_unit(request).await
    }

    async fn work_item_relations(
        &self,
        id: WorkItemId,
        project: &str,
    ) -> Result<Vec<Relation>, RemoteError> {
        let url = self.api_url(Some(project), &format!("wit/workitems/{id}"));
        let request = self.get(&url).query(&[("$expand", "relations")]);
        let dto: WorkItemDto = self.send_json(request).await?;

        Ok(dto
            .relations
            .unwrap_or_default()
            .into_iter()
            .filter_map(|relation| {
                Some(Relation {
                    rel: relation.rel?,
                    url: relation.url?,
                })
            })
            .collect())
    }

    async fn query_work_item_ids(
        &self,
        wiql: &str,
        project: Option<&str>,
        limit: u32,
    ) -> Result<Vec<WorkItemId>, RemoteError> {
        let url = self.api_url(project, "wit/wiql");
        let request = self
            .post(&url)
            .query(&[("$top", limit.to_string())])
            .json(&WiqlQueryDto {
                query: wiql.to_owned(),
            });
        let dto: WiqlResultDto = self.send_json(request).await?;

        Ok(dto
            .work_items
            .into_iter()
            .filter_map(|row| row.id.and_then(|id| WorkItemId::new(id).ok()))
            .collect())
    }
}
