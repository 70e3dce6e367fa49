//! Branch naming policy and canonical branch references.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::{WorkItemId, WorkflowDomainError};

/// Canonical prefix of branch refs.
const REF_HEADS_PREFIX: &str = "refs/heads/";

/// Fallback slug when a title yields no usable characters.
const EMPTY_SLUG_FALLBACK: &str = "work-item";

/// Default maximum slug length.
pub const DEFAULT_SLUG_MAX_LENGTH: usize = 60;

/// Returns the branch prefix implied by a work-item type.
///
/// Any type containing "bug" case-insensitively maps to `bug`; everything
/// else maps to `feature`.
#[must_use]
pub fn branch_prefix(work_item_type: &str) -> &'static str {
    if work_item_type.to_lowercase().contains("bug") {
        "bug"
    } else {
        "feature"
    }
}

/// Derives a URL-safe slug from a work-item title.
///
/// Internal whitespace is collapsed, the title is decomposed (NFKD) with
/// combining marks stripped, lowercased, and every run of characters outside
/// `[a-z0-9]` becomes a single hyphen. The result is trimmed of leading and
/// trailing hyphens, truncated to `max_length` characters and trimmed again;
/// an empty result falls back to `work-item`.
#[must_use]
pub fn branch_slug(title: &str, max_length: usize) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let decomposed: String = collapsed.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let mut slug = String::new();
    let mut pending_separator = false;
    for c in decomposed.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        return EMPTY_SLUG_FALLBACK.to_owned();
    }

    let truncated: String = slug.chars().take(max_length).collect();
    let trimmed = truncated.trim_end_matches('-');
    if trimmed.is_empty() {
        EMPTY_SLUG_FALLBACK.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Builds the deterministic branch name for a work item.
#[must_use]
pub fn branch_name(id: WorkItemId, title: &str, work_item_type: &str) -> String {
    let prefix = branch_prefix(work_item_type);
    let slug = branch_slug(title, DEFAULT_SLUG_MAX_LENGTH);
    format!("{prefix}/{id}-{slug}")
}

/// Reports whether a short branch name visibly corresponds to a work item.
///
/// The name must match `(bug|feature)/<id>(-.*)?` case-insensitively.
#[must_use]
pub fn branch_matches_work_item(short_name: &str, id: WorkItemId) -> bool {
    let normalized = short_name.trim().to_lowercase();
    let id_token = id.to_string();
    ["bug/", "feature/"].iter().any(|prefix| {
        normalized
            .strip_prefix(prefix)
            .is_some_and(|rest| rest == id_token || rest.starts_with(&format!("{id_token}-")))
    })
}

/// Canonical branch reference of the form `refs/heads/<name>`.
///
/// Short names are normalized on construction; the canonical form is never
/// stored short.
///
/// # Examples
///
///     use workcycle::workflow::domain::BranchRef;
///
///     let branch = BranchRef::normalize("main").expect("valid");
///     assert_eq!(branch.as_str(), "refs/heads/main");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchRef(String);

impl BranchRef {
    /// Normalizes a branch name or ref into canonical form.
    ///
    /// Already-canonical refs pass through unchanged; otherwise leading
    /// slashes are stripped and the `refs/heads/` prefix is prepended.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyBranchName`] when the input is
    /// empty after trimming.
    pub fn normalize(name_or_ref: &str) -> Result<Self, WorkflowDomainError> {
        let trimmed = name_or_ref.trim();
        if trimmed.is_empty() {
            return Err(WorkflowDomainError::EmptyBranchName);
        }

        if trimmed.starts_with(REF_HEADS_PREFIX) {
            return Ok(Self(trimmed.to_owned()));
        }

        let short = trimmed.trim_start_matches('/');
        if short.is_empty() {
            return Err(WorkflowDomainError::EmptyBranchName);
        }
        Ok(Self(format!("{REF_HEADS_PREFIX}{short}")))
    }

    /// Returns the canonical ref.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the short branch name without the `refs/heads/` prefix.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.strip_prefix(REF_HEADS_PREFIX).unwrap_or(&self.0)
    }

    /// Returns the ref formatted for the remote ref-listing filter, which
    /// expects names without the leading `refs/`.
    #[must_use]
    pub fn api_filter(&self) -> &str {
        self.0.strip_prefix("refs/").unwrap_or(&self.0)
    }

    /// Case-insensitive ref comparison.
    #[must_use]
    pub fn matches_ignore_case(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Case-insensitive comparison against a raw ref name.
    #[must_use]
    pub fn matches_name_ignore_case(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BranchRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
