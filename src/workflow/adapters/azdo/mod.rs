//! Azure DevOps REST adapter.
//!
//! Implements the [`WorkItemTracking`](crate::workflow::ports::WorkItemTracking)
//! and [`GitRemote`](crate::workflow::ports::GitRemote) ports over the Azure
//! DevOps REST API (`api-version=7.1`) with personal-access-token basic
//! authentication.

mod git;
mod models;
mod work_items;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::domain::ResolvedCredentials;
use crate::workflow::ports::RemoteError;

/// REST API version requested on every call.
const API_VERSION: &str = "7.1";

/// Content type of JSON-patch bodies.
const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Characters kept verbatim when encoding URL path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Authenticated client for one organization endpoint.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AzureDevOpsClient {
    /// Creates a client for the organization in `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(credentials: &ResolvedCredentials) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("workcycle/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: credentials
                .organization_url()
                .as_str()
                .trim_end_matches('/')
                .to_owned(),
            token: credentials.token().to_owned(),
        })
    }

    /// Builds an API URL, optionally scoped to a project.
    fn api_url(&self, project: Option<&str>, resource: &str) -> String {
        match project {
            Some(name) => {
                let encoded = utf8_percent_encode(name, PATH_SEGMENT);
                format!("{}/{encoded}/_apis/{resource}", self.base_url)
            }
            None => format!("{}/_apis/{resource}", self.base_url),
        }
    }

    /// Starts a GET request with the API version applied.
    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).query(&[("api-version", API_VERSION)])
    }

    /// Starts a POST request with the API version applied.
    fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).query(&[("api-version", API_VERSION)])
    }

    /// Starts a JSON-patch PATCH request with the API version applied.
    fn patch(&self, url: &str) -> RequestBuilder {
        self.http
            .patch(url)
            .query(&[("api-version", API_VERSION)])
            .header(reqwest::header::CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
    }

    /// Sends a request and decodes a JSON response body.
    async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder).await?;
        Self::check_status(&response)?;
        Self::decode(response).await
    }

    /// Sends a request, mapping a 404 response to `None`.
    async fn send_json_optional<T>(&self, builder: RequestBuilder) -> Result<Option<T>, RemoteError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check_status(&response)?;
        Ok(Some(Self::decode(response).await?))
    }

    /// Sends a request and discards the response body.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        let response = self.send(builder).await?;
        Self::check_status(&response)?;
        Ok(())
    }

    /// Applies authentication and performs the request.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let request = builder
            .basic_auth("", Some(&self.token))
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        debug!(method = %request.method(), url = %request.url(), "remote call");
        self.http
            .execute(request)
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))
    }

    /// Classifies non-success statuses.
    fn check_status(response: &Response) -> Result<(), RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = format!("{} for {}", status, response.url());
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(RemoteError::Authentication {
                status: status.as_u16(),
                message,
            });
        }
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decodes a JSON response body.
    async fn decode<T>(response: Response) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        response
            .json()
            .await
            .map_err(|err| RemoteError::Parse(err.to_string()))
    }
}
