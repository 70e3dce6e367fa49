//! Error types for repository-identifier parsing.

use thiserror::Error;

/// Errors returned while parsing repository identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoTargetError {
    /// The identifier is empty after trimming.
    #[error("repository value is empty. Provide a local path or Azure Repos repository URL")]
    EmptyIdentifier,

    /// The identifier looked like a URL but failed to parse.
    #[error("repository URL is invalid: '{0}'. Use an Azure Repos URL such as https://dev.azure.com/org/_git/repo or https://dev.azure.com/org/project/_git/repo")]
    InvalidUrl(String),

    /// The URL parsed but matches no supported Azure Repos dialect.
    #[error("'{0}' is not an Azure Repos URL. Use a format like https://dev.azure.com/org/_git/repo or https://dev.azure.com/org/project/_git/repo")]
    UnsupportedRemote(String),
}
