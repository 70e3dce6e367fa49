//! Parsing of the supported Azure Repos URL dialects.
//!
//! Dialects are tried in a fixed priority order, first match wins:
//!
//! 1. SCP-style ssh remotes (`git@ssh.dev.azure.com:v3/org/project/repo`)
//! 2. Generic URL parse, then `dev.azure.com`, `<org>.visualstudio.com` and
//!    `ssh://ssh.dev.azure.com/v3/...` matchers
//!
//! Every segment is percent-decoded and a trailing `.git` on the repository
//! segment is stripped.

use percent_encoding::percent_decode_str;
use url::Url;

use super::RepoTargetError;

/// Prefix of SCP-style ssh remotes.
const SCP_PREFIX: &str = "git@ssh.dev.azure.com:v3/";

/// Host serving modern repository URLs.
const MODERN_HOST: &str = "dev.azure.com";

/// Host suffix of the legacy per-organization subdomain dialect.
const LEGACY_HOST_SUFFIX: &str = ".visualstudio.com";

/// Host serving ssh-URL remotes.
const SSH_HOST: &str = "ssh.dev.azure.com";

/// Repository coordinates extracted from a remote identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRemoteRepo {
    /// Organization owning the repository.
    pub organization: String,
    /// Project owning the repository, when the dialect carries one.
    pub project: Option<String>,
    /// Repository name with any `.git` suffix stripped.
    pub repository: String,
}

/// Reports whether the identifier should be treated as a remote URL rather
/// than a local filesystem path.
#[must_use]
pub fn looks_like_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("git@") {
        return true;
    }
    lower.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|first| first.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
    })
}

/// Parses a remote repository identifier in any supported dialect.
///
/// # Errors
///
/// Returns [`RepoTargetError`] when the identifier is empty, fails to parse
/// as a URL, or matches none of the supported dialects.
pub fn parse_remote_identifier(input: &str) -> Result<ParsedRemoteRepo, RepoTargetError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RepoTargetError::EmptyIdentifier);
    }

    if let Some(parsed) = parse_scp_style(trimmed) {
        return Ok(parsed);
    }

    let url = Url::parse(trimmed).map_err(|_| RepoTargetError::InvalidUrl(trimmed.to_owned()))?;

    parse_modern_url(&url)
        .or_else(|| parse_legacy_url(&url))
        .or_else(|| parse_ssh_url(&url))
        .ok_or_else(|| RepoTargetError::UnsupportedRemote(trimmed.to_owned()))
}

/// Parses `git@ssh.dev.azure.com:v3/<org>/<project>/<repo>[.git]`.
fn parse_scp_style(input: &str) -> Option<ParsedRemoteRepo> {
    let lower = input.to_ascii_lowercase();
    if !lower.starts_with(SCP_PREFIX) {
        return None;
    }
    let rest: String = input.chars().skip(SCP_PREFIX.chars().count()).collect();
    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [organization, project, repository]
            if !organization.is_empty() && !project.is_empty() && !repository.is_empty() =>
        {
            Some(ParsedRemoteRepo {
                organization: decode_segment(organization),
                project: Some(decode_segment(project)),
                repository: trim_git_suffix(&decode_segment(repository)),
            })
        }
        _ => None,
    }
}

/// Parses `https://dev.azure.com/<org>[/<project>]/_git/<repo>`.
fn parse_modern_url(url: &Url) -> Option<ParsedRemoteRepo> {
    if !host_matches(url, MODERN_HOST) {
        return None;
    }
    let segments = decoded_segments(url);
    match segments.as_slice() {
        [organization, git, repository] if is_git_segment(git) => Some(ParsedRemoteRepo {
            organization: organization.clone(),
            project: None,
            repository: trim_git_suffix(repository),
        }),
        [organization, project, git, repository, ..] if is_git_segment(git) => {
            Some(ParsedRemoteRepo {
                organization: organization.clone(),
                project: Some(project.clone()),
                repository: trim_git_suffix(repository),
            })
        }
        _ => None,
    }
}

/// Parses `https://<org>.visualstudio.com[/<project>]/_git/<repo>`.
fn parse_legacy_url(url: &Url) -> Option<ParsedRemoteRepo> {
    let host = url.host_str()?.to_ascii_lowercase();
    let organization = host.strip_suffix(LEGACY_HOST_SUFFIX)?;
    if organization.is_empty() {
        return None;
    }
    let segments = decoded_segments(url);
    match segments.as_slice() {
        [git, repository] if is_git_segment(git) => Some(ParsedRemoteRepo {
            organization: organization.to_owned(),
            project: None,
            repository: trim_git_suffix(repository),
        }),
        [project, git, repository, ..] if is_git_segment(git) => Some(ParsedRemoteRepo {
            organization: organization.to_owned(),
            project: Some(project.clone()),
            repository: trim_git_suffix(repository),
        }),
        _ => None,
    }
}

/// Parses `ssh://ssh.dev.azure.com[:port]/v3/<org>/<project>/<repo>`.
fn parse_ssh_url(url: &Url) -> Option<ParsedRemoteRepo> {
    if url.scheme() != "ssh" || !host_matches(url, SSH_HOST) {
        return None;
    }
    let segments = decoded_segments(url);
    match segments.as_slice() {
        [v3, organization, project, repository, ..] if v3.eq_ignore_ascii_case("v3") => {
            Some(ParsedRemoteRepo {
                organization: organization.clone(),
                project: Some(project.clone()),
                repository: trim_git_suffix(repository),
            })
        }
        _ => None,
    }
}

/// Case-insensitive host comparison.
fn host_matches(url: &Url, expected: &str) -> bool {
    url.host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(expected))
}

/// Reports whether a path segment is the `_git` marker.
fn is_git_segment(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("_git")
}

/// Returns the non-empty, percent-decoded path segments.
fn decoded_segments(url: &Url) -> Vec<String> {
    url.path_segments().map_or_else(Vec::new, |segments| {
        segments
            .filter(|segment| !segment.is_empty())
            .map(decode_segment)
            .collect()
    })
}

/// Percent-decodes a single segment, tolerating invalid escapes.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Strips a trailing `.git` (any case) from a repository segment.
fn trim_git_suffix(value: &str) -> String {
    if value.to_ascii_lowercase().ends_with(".git") {
        value
            .chars()
            .take(value.chars().count().saturating_sub(4))
            .collect()
    } else {
        value.to_owned()
    }
}
