//! Error types for credential domain validation.

use thiserror::Error;

/// Errors returned while constructing credential domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthDomainError {
    /// The organization value is empty after trimming.
    #[error("Azure DevOps organization cannot be empty")]
    EmptyOrganization,

    /// The organization name contains nothing but separators.
    #[error("invalid organization value '{0}', provide a name like 'myorg'")]
    InvalidOrganizationName(String),

    /// The organization URL failed to parse.
    #[error("invalid organization URL: {0}")]
    InvalidOrganizationUrl(String),

    /// The organization URL uses a scheme other than https.
    #[error("Azure DevOps organization URL must use https")]
    NonHttpsOrganizationUrl,

    /// A `dev.azure.com` URL is missing the organization path segment.
    #[error("organization URL must include the organization name, for example https://dev.azure.com/myorg")]
    MissingOrganizationSegment,

    /// The personal access token is empty after trimming.
    #[error("Azure DevOps personal access token cannot be empty")]
    EmptyToken,
}
