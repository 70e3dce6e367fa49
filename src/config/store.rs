//! Stored configuration schema and file persistence.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for `default_limit`.
const MAX_DEFAULT_LIMIT: u32 = 500;

/// Errors returned while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform exposes no configuration directory.
    #[error("cannot determine a configuration directory for this platform")]
    NoConfigDirectory,

    /// The configuration directory path is not valid UTF-8.
    #[error("configuration directory is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// The configuration file exists but holds invalid content.
    #[error("config file is invalid: {path}. Fix it or remove it, then rerun workcycle. ({reason})")]
    Invalid {
        /// Path of the offending file.
        path: Utf8PathBuf,
        /// Why the content was rejected.
        reason: String,
    },

    /// Filesystem access failed.
    #[error("config file access failed: {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Persisted configuration values.
///
/// Every field is optional; an absent file deserializes to the default.
/// Unknown fields are rejected so typos surface instead of silently
/// vanishing on the next write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredConfig {
    /// Default organization name or URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// Personal access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat: Option<String>,

    /// Default listing page size (used by listing features).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u32>,

    /// Default repository path or URL for `start`/`finish`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,
}

impl StoredConfig {
    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the file content fails to parse
    /// or violates a field constraint, or [`ConfigError::Io`] when the file
    /// cannot be read.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source: err,
                });
            }
        };

        let config: Self = serde_json::from_str(&raw).map_err(|err| ConfigError::Invalid {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// On Unix the file mode is tightened to `0o600` because the file may
    /// hold a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field violates a constraint
    /// or [`ConfigError::Io`] when the file cannot be written.
    pub fn store(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        self.validate(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| ConfigError::Io {
                path: path.to_owned(),
                source: err,
            })?;
        }

        let body = serde_json::to_string_pretty(self).map_err(|err| ConfigError::Invalid {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        fs::write(path, format!("{body}\n")).map_err(|err| ConfigError::Io {
            path: path.to_owned(),
            source: err,
        })?;

        restrict_permissions(path)
    }

    /// Loads `path`, overlays `patch`, writes the result back and returns it.
    ///
    /// Fields set in `patch` replace stored values; unset fields survive.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from the load and store steps.
    pub fn merge_into(path: &Utf8Path, patch: Self) -> Result<Self, ConfigError> {
        let existing = Self::load(path)?;
        let merged = existing.overlaid_with(patch);
        merged.store(path)?;
        Ok(merged)
    }

    /// Returns this configuration with `patch` fields taking precedence.
    #[must_use]
    pub fn overlaid_with(self, patch: Self) -> Self {
        Self {
            org: patch.org.or(self.org),
            pat: patch.pat.or(self.pat),
            default_limit: patch.default_limit.or(self.default_limit),
            default_repo: patch.default_repo.or(self.default_repo),
        }
    }

    /// Validates field constraints.
    fn validate(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            path: path.to_owned(),
            reason,
        };

        for (field, value) in [
            ("org", &self.org),
            ("pat", &self.pat),
            ("default_repo", &self.default_repo),
        ] {
            if let Some(text) = value
                && text.trim().is_empty()
            {
                return Err(invalid(format!("field '{field}' must not be blank")));
            }
        }

        if let Some(limit) = self.default_limit
            && !(1..=MAX_DEFAULT_LIMIT).contains(&limit)
        {
            return Err(invalid(format!(
                "field 'default_limit' must be between 1 and {MAX_DEFAULT_LIMIT}, got {limit}"
            )));
        }

        Ok(())
    }
}

/// Restricts the config file to owner read/write on Unix platforms.
#[cfg(unix)]
fn restrict_permissions(path: &Utf8Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|err| ConfigError::Io {
        path: path.to_owned(),
        source: err,
    })
}

/// File mode hardening is not supported off Unix.
#[cfg(not(unix))]
fn restrict_permissions(_path: &Utf8Path) -> Result<(), ConfigError> {
    Ok(())
}
