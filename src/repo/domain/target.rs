//! Resolved repository target value object.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// How the repository was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoMode {
    /// Addressed by a remote URL.
    Url,
    /// Addressed by a local filesystem path.
    Path,
}

impl RepoMode {
    /// Returns the lowercase display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for RepoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the repository identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoSource {
    /// Supplied with `--repo`.
    Flag,
    /// Read from the stored configuration.
    Config,
}

impl RepoSource {
    /// Returns the lowercase display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Config => "config",
        }
    }
}

/// Canonical, organization-validated repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    source: RepoSource,
    original_input: String,
    mode: RepoMode,
    organization: String,
    project: Option<String>,
    repository: String,
    local_path: Option<Utf8PathBuf>,
}

impl RepoTarget {
    /// Creates a target resolved from a remote URL.
    #[must_use]
    pub const fn from_url(
        source: RepoSource,
        original_input: String,
        organization: String,
        project: Option<String>,
        repository: String,
    ) -> Self {
        Self {
            source,
            original_input,
            mode: RepoMode::Url,
            organization,
            project,
            repository,
            local_path: None,
        }
    }

    /// Creates a target resolved from a local working tree.
    #[must_use]
    pub const fn from_local(
        source: RepoSource,
        original_input: String,
        organization: String,
        project: Option<String>,
        repository: String,
        local_path: Utf8PathBuf,
    ) -> Self {
        Self {
            source,
            original_input,
            mode: RepoMode::Path,
            organization,
            project,
            repository,
            local_path: Some(local_path),
        }
    }

    /// Returns where the identifier came from.
    #[must_use]
    pub const fn source(&self) -> RepoSource {
        self.source
    }

    /// Returns the identifier exactly as supplied.
    #[must_use]
    pub fn original_input(&self) -> &str {
        &self.original_input
    }

    /// Returns how the repository was addressed.
    #[must_use]
    pub const fn mode(&self) -> RepoMode {
        self.mode
    }

    /// Returns the organization owning the repository.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the project segment, when the identifier carried one.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Returns the repository name.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the absolute local path for path-mode targets.
    #[must_use]
    pub fn local_path(&self) -> Option<&Utf8Path> {
        self.local_path.as_deref()
    }
}
