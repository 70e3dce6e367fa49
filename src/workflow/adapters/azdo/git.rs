//! Remote git operations over the Azure DevOps REST API.

use async_trait::async_trait;
use uuid::Uuid;

use crate::workflow::domain::BranchRef;
use crate::workflow::ports::{
    CreatePullRequest, GitRemote, ObjectId, ProjectRef, PullRequestPayload, RefCreateError,
    RemoteError, RemoteRef, RepositoryId, RepositoryInfo,
};

use super::AzureDevOpsClient;
use super::models::{
    CreatePullRequestDto, ListResponse, PullRequestDto, RefDto, RefUpdateRequestDto,
    RefUpdateResultDto, RepositoryDto,
};

/// Ref-update status reported when the name is already taken.
const STATUS_REF_NAME_CONFLICT: &str = "refNameConflict";

/// Ref-update status reported when branch creation is not permitted.
const STATUS_CREATE_PERMISSION_REQUIRED: &str = "createBranchPermissionRequired";

/// Pull-request status filter for active pull requests.
const PULL_REQUEST_STATUS_ACTIVE: &str = "active";

#[async_trait]
impl GitRemote for AzureDevOpsClient {
    async fn repository(
        &self,
        name: &str,
        project: &str,
    ) -> Result<Option<RepositoryInfo>, RemoteError> {
        let url = self.api_url(Some(project), &format!("git/repositories/{name}"));
        let dto: Option<RepositoryDto> = self.send_json_optional(self.get(&url)).await?;
        dto.map(|repository| repository_from_dto(repository, Some(project)))
            .transpose()
    }

    async fn repositories(&self) -> Result<Vec<RepositoryInfo>, RemoteError> {
        let url = self.api_url(None, "git/repositories");
        let dto: ListResponse<RepositoryDto> = self.send_json(self.get(&url)).await?;
        Ok(dto
            .value
            .into_iter()
            .filter_map(|repository| repository_from_dto(repository, None).ok())
            .collect())
    }

    async fn refs(
        &self,
        repository: &RepositoryInfo,
        filter: &str,
    ) -> Result<Vec<RemoteRef>, RemoteError> {
        let url = self.api_url(
            Some(&repository.project.api_identifier()),
            &format!("git/repositories/{}/refs", repository.id),
        );
        let request = self.get(&url).query(&[("filter", filter)]);
        let dto: ListResponse<RefDto> = self.send_json(request).await?;

        Ok(dto
            .value
            .into_iter()
            .filter_map(|remote_ref| {
                Some(RemoteRef {
                    name: remote_ref.name?,
                    object_id: ObjectId::new(remote_ref.object_id?),
                })
            })
            .collect())
    }

    async fn create_ref(
        &self,
        repository: &RepositoryInfo,
        name: &BranchRef,
        expected_old: &ObjectId,
        new_object: &ObjectId,
    ) -> Result<(), RefCreateError> {
        let url = self.api_url(
            Some(&repository.project.api_identifier()),
            &format!("git/repositories/{}/refs", repository.id),
        );
        let body = [RefUpdateRequestDto {
            name: name.as_str().to_owned(),
            old_object_id: expected_old.as_str().to_owned(),
            new_object_id: new_object.as_str().to_owned(),
        }];
        let request = self.post(&url).json(&body);
        let dto: ListResponse<RefUpdateResultDto> = self.send_json(request).await?;

        let first = dto.value.into_iter().next().ok_or_else(|| {
            RemoteError::Parse("ref update response carried no results".to_owned())
        })?;
        if first.success == Some(true) {
            return Ok(());
        }

        match first.update_status.as_deref() {
            Some(STATUS_REF_NAME_CONFLICT) => Err(RefCreateError::NameConflict),
            Some(STATUS_CREATE_PERMISSION_REQUIRED) => Err(RefCreateError::PermissionDenied),
            _ => Err(RefCreateError::Rejected(first.custom_message)),
        }
    }

    async fn pull_requests(
        &self,
        repository: &RepositoryInfo,
        source_ref: &BranchRef,
        target_ref: &BranchRef,
    ) -> Result<Vec<PullRequestPayload>, RemoteError> {
        let url = self.api_url(
            Some(&repository.project.api_identifier()),
            &format!("git/repositories/{}/pullrequests", repository.id),
        );
        let request = self.get(&url).query(&[
            ("searchCriteria.sourceRefName", source_ref.as_str()),
            ("searchCriteria.targetRefName", target_ref.as_str()),
            ("searchCriteria.status", PULL_REQUEST_STATUS_ACTIVE),
        ]);
        let dto: ListResponse<PullRequestDto> = self.send_json(request).await?;

        Ok(dto.value.into_iter().map(payload_from_dto).collect())
    }

    async fn create_pull_request(
        &self,
        repository: &RepositoryInfo,
        request: &CreatePullRequest,
    ) -> Result<PullRequestPayload, RemoteError> {
        let url = self.api_url(
            Some(&repository.project.api_identifier()),
            &format!("git/repositories/{}/pullrequests", repository.id),
        );
        let body = CreatePullRequestDto {
            source_ref_name: request.source_ref.as_str().to_owned(),
            target_ref_name: request.target_ref.as_str().to_owned(),
            title: request.title.clone(),
            description: request.description.clone(),
            is_draft: request.draft,
        };
        let dto: PullRequestDto = self.send_json(self.post(&url).json(&body)).await?;
        Ok(payload_from_dto(dto))
    }
}

/// Converts a repository DTO, requiring id, name and a project name.
fn repository_from_dto(
    dto: RepositoryDto,
    fallback_project: Option<&str>,
) -> Result<RepositoryInfo, RemoteError> {
    let raw_id = dto
        .id
        .ok_or_else(|| RemoteError::Parse("repository response missing id".to_owned()))?;
    let id = RepositoryId::parse(&raw_id)?;

    let name = dto
        .name
        .ok_or_else(|| RemoteError::Parse("repository response missing name".to_owned()))?;

    let project_id = dto
        .project
        .as_ref()
        .and_then(|project| project.id.as_deref())
        .and_then(|value| Uuid::parse_str(value).ok());
    let project_name = dto
        .project
        .and_then(|project| project.name)
        .or_else(|| fallback_project.map(str::to_owned))
        .ok_or_else(|| RemoteError::Parse("repository response missing project".to_owned()))?;

    Ok(RepositoryInfo {
        id,
        name,
        project: ProjectRef {
            id: project_id,
            name: project_name,
        },
        default_branch: dto.default_branch,
        remote_url: dto.remote_url,
        ssh_url: dto.ssh_url,
    })
}

/// Converts a pull-request DTO into the port payload.
fn payload_from_dto(dto: PullRequestDto) -> PullRequestPayload {
    PullRequestPayload {
        id: dto.pull_request_id,
        url: dto.remote_url,
        is_draft: dto.is_draft,
        artifact_id: dto.artifact_id,
    }
}
