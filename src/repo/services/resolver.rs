//! Service resolving a repository identifier into a validated target.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::auth::domain::OrganizationUrl;
use crate::repo::domain::{
    ParsedRemoteRepo, RepoSource, RepoTarget, RepoTargetError, looks_like_url,
    parse_remote_identifier,
};
use crate::repo::ports::{LocalGit, LocalGitError};

/// Errors returned while resolving a repository target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoResolutionError {
    /// The identifier failed to parse.
    #[error(transparent)]
    Target(#[from] RepoTargetError),

    /// A local git invocation failed.
    #[error(transparent)]
    LocalGit(#[from] LocalGitError),

    /// Neither `--repo` nor a configured default repository is available.
    #[error("repository is not set. Use `workcycle repo set <path-or-url>` or provide `--repo <path-or-url>`")]
    NotConfigured,

    /// The local path does not exist.
    #[error("repository path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The local path exists but is not a directory.
    #[error("repository path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// The local path is not inside a git working tree.
    #[error("path is not a git repository: {0}")]
    NotAGitRepository(Utf8PathBuf),

    /// The working tree has no usable `origin` remote URL.
    #[error("git origin remote is empty for repository path: {0}")]
    EmptyOriginRemote(Utf8PathBuf),

    /// The canonicalized path is not valid UTF-8.
    #[error("repository path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// The identifier names a different organization than the endpoint.
    #[error("repository organization '{found}' does not match configured organization '{expected}'")]
    OrgMismatch {
        /// Organization named by the identifier.
        found: String,
        /// Organization implied by the configured endpoint.
        expected: String,
    },
}

/// Resolves repository identifiers into organization-validated targets.
#[derive(Clone)]
pub struct RepoTargetResolver<G>
where
    G: LocalGit,
{
    local_git: Arc<G>,
}

impl<G> RepoTargetResolver<G>
where
    G: LocalGit,
{
    /// Creates a resolver using `local_git` for path-mode identifiers.
    #[must_use]
    pub const fn new(local_git: Arc<G>) -> Self {
        Self { local_git }
    }

    /// Resolves the effective repository identifier.
    ///
    /// The `--repo` flag takes precedence over the configured default. URL
    /// identifiers are parsed directly; anything else is treated as a local
    /// path whose `origin` remote is parsed with the same dialects. The
    /// organization named by the identifier must match the configured
    /// endpoint's organization case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`RepoResolutionError`] when no identifier is available, when
    /// parsing or local git access fails, or on an organization mismatch.
    pub async fn resolve(
        &self,
        repo_flag: Option<&str>,
        default_repo: Option<&str>,
        organization_url: &OrganizationUrl,
    ) -> Result<RepoTarget, RepoResolutionError> {
        let flag_value = non_blank(repo_flag);
        let selected = flag_value
            .clone()
            .or_else(|| non_blank(default_repo))
            .ok_or(RepoResolutionError::NotConfigured)?;
        let source = if flag_value.is_some() {
            RepoSource::Flag
        } else {
            RepoSource::Config
        };

        let target = if looks_like_url(&selected) {
            let parsed = parse_remote_identifier(&selected)?;
            check_organization(&parsed, organization_url)?;
            RepoTarget::from_url(
                source,
                selected,
                parsed.organization,
                parsed.project,
                parsed.repository,
            )
        } else {
            self.resolve_local(source, &selected, organization_url)
                .await?
        };

        debug!(
            mode = %target.mode(),
            organization = target.organization(),
            repository = target.repository(),
            "resolved repository target"
        );
        Ok(target)
    }

    /// Resolves a local-path identifier through its `origin` remote.
    async fn resolve_local(
        &self,
        source: RepoSource,
        selected: &str,
        organization_url: &OrganizationUrl,
    ) -> Result<RepoTarget, RepoResolutionError> {
        let path = canonical_directory(Utf8Path::new(selected))?;

        if !self.local_git.is_work_tree(&path).await? {
            return Err(RepoResolutionError::NotAGitRepository(path));
        }

        let origin_url = self.local_git.origin_remote_url(&path).await?;
        if origin_url.trim().is_empty() {
            return Err(RepoResolutionError::EmptyOriginRemote(path));
        }

        let parsed = parse_remote_identifier(&origin_url)?;
        check_organization(&parsed, organization_url)?;

        Ok(RepoTarget::from_local(
            source,
            selected.to_owned(),
            parsed.organization,
            parsed.project,
            parsed.repository,
            path,
        ))
    }
}

/// Verifies the identifier's organization against the endpoint's.
fn check_organization(
    parsed: &ParsedRemoteRepo,
    organization_url: &OrganizationUrl,
) -> Result<(), RepoResolutionError> {
    let expected = organization_url.organization();
    if parsed.organization.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(RepoResolutionError::OrgMismatch {
            found: parsed.organization.clone(),
            expected: expected.to_owned(),
        })
    }
}

/// Returns the trimmed value when it is non-empty.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}

/// Canonicalizes `path` and requires it to be an existing directory.
fn canonical_directory(path: &Utf8Path) -> Result<Utf8PathBuf, RepoResolutionError> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| RepoResolutionError::PathNotFound(path.to_owned()))?;
    if !metadata.is_dir() {
        return Err(RepoResolutionError::NotADirectory(path.to_owned()));
    }

    let canonical = std::fs::canonicalize(path)
        .map_err(|_| RepoResolutionError::PathNotFound(path.to_owned()))?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|raw| RepoResolutionError::NonUtf8Path(raw.display().to_string()))
}
