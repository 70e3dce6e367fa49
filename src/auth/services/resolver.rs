//! Service resolving credentials from flags, environment, config and prompts.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::auth::domain::{
    AuthDomainError, CredentialSource, OrganizationUrl, ResolvedCredentials,
};
use crate::auth::ports::{Console, Environment, PromptError};
use crate::config::{ConfigError, StoredConfig};

/// Environment variable holding a full organization URL.
const ENV_ORG_URL: &str = "AZDO_ORG_URL";

/// Environment variable holding an organization name.
const ENV_ORG: &str = "AZDO_ORG";

/// Environment variable holding a personal access token.
const ENV_PAT: &str = "AZDO_PAT";

/// Prompt shown when the organization is missing.
const ORG_PROMPT: &str = "Azure DevOps organization (name or URL):";

/// Prompt shown when a token is required.
const TOKEN_PROMPT: &str = "Azure DevOps Personal Access Token (PAT):";

/// Errors returned while resolving credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AuthDomainError),

    /// Config file access failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terminal prompting failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// No organization is available and the terminal is non-interactive.
    #[error("missing Azure DevOps organization. Set {ENV_ORG}/{ENV_ORG_URL} or run workcycle in an interactive terminal")]
    MissingOrganization,

    /// No token is available and the terminal is non-interactive.
    #[error("missing Azure DevOps PAT. Set {ENV_PAT} or run workcycle in an interactive terminal")]
    MissingToken,

    /// `--reauth` was requested without an interactive terminal.
    #[error("--reauth requires an interactive terminal")]
    ReauthNotInteractive,
}

/// Caller inputs influencing credential resolution.
#[derive(Debug, Clone, Default)]
pub struct CredentialRequest {
    /// Organization name or URL from the command line.
    pub org_flag: Option<String>,
    /// Force a fresh token prompt before executing.
    pub reauth: bool,
}

/// A picked value together with its source.
struct Picked {
    value: Option<String>,
    source: CredentialSource,
}

/// Resolves credentials once per command invocation.
#[derive(Clone)]
pub struct CredentialResolver<C, E>
where
    C: Console,
    E: Environment,
{
    console: Arc<C>,
    env: Arc<E>,
    config_path: Utf8PathBuf,
}

impl<C, E> CredentialResolver<C, E>
where
    C: Console,
    E: Environment,
{
    /// Creates a resolver persisting prompted values to `config_path`.
    #[must_use]
    pub const fn new(console: Arc<C>, env: Arc<E>, config_path: Utf8PathBuf) -> Self {
        Self {
            console,
            env,
            config_path,
        }
    }

    /// Returns the config file path this resolver persists to.
    #[must_use]
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Resolves credentials according to the flag → env → config → prompt
    /// precedence, persisting any prompted values.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when a required value is unavailable in a
    /// non-interactive context, when prompting fails, or when the resolved
    /// organization is invalid.
    pub fn resolve(&self, request: &CredentialRequest) -> Result<ResolvedCredentials, CredentialError> {
        let stored = StoredConfig::load(&self.config_path)?;
        let interactive = self.console.is_interactive();

        let picked_org = self.pick_organization(request.org_flag.as_deref(), &stored);
        let picked_token = self.pick_token(&stored);
        let mut should_persist = false;

        let (org_input, org_source) = match picked_org.value {
            Some(value) => (value, picked_org.source),
            None => {
                if !interactive {
                    return Err(CredentialError::MissingOrganization);
                }
                should_persist = true;
                (self.prompt_organization()?, CredentialSource::Prompt)
            }
        };

        let (token, token_source) = if request.reauth {
            if !interactive {
                return Err(CredentialError::ReauthNotInteractive);
            }
            should_persist = true;
            (self.prompt_token()?, CredentialSource::Prompt)
        } else {
            match picked_token.value {
                Some(value) => (value, picked_token.source),
                None => {
                    if !interactive {
                        return Err(CredentialError::MissingToken);
                    }
                    should_persist = true;
                    (self.prompt_token()?, CredentialSource::Prompt)
                }
            }
        };

        let organization_url = OrganizationUrl::normalize(&org_input)?;

        if should_persist {
            self.persist(&org_input, &token)?;
        }

        debug!(
            organization = %organization_url,
            org_source = org_source.as_str(),
            token_source = token_source.as_str(),
            "resolved credentials"
        );

        Ok(ResolvedCredentials::new(
            org_input,
            organization_url,
            token,
            org_source,
            token_source,
        ))
    }

    /// Prompts for a replacement token and persists it alongside the
    /// organization that produced `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when prompting or persistence fails.
    pub fn reacquire_token(
        &self,
        credentials: &ResolvedCredentials,
    ) -> Result<String, CredentialError> {
        let token = self.prompt_token()?;
        self.persist(credentials.organization_input(), &token)?;
        Ok(token)
    }

    /// Reports whether the attached terminal is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.console.is_interactive()
    }

    fn pick_organization(&self, flag: Option<&str>, stored: &StoredConfig) -> Picked {
        if let Some(value) = non_blank(flag) {
            return Picked {
                value: Some(value),
                source: CredentialSource::Flag,
            };
        }
        for key in [ENV_ORG_URL, ENV_ORG] {
            if let Some(value) = non_blank(self.env.var(key).as_deref()) {
                return Picked {
                    value: Some(value),
                    source: CredentialSource::Env,
                };
            }
        }
        if let Some(value) = non_blank(stored.org.as_deref()) {
            return Picked {
                value: Some(value),
                source: CredentialSource::Config,
            };
        }
        Picked {
            value: None,
            source: CredentialSource::Prompt,
        }
    }

    fn pick_token(&self, stored: &StoredConfig) -> Picked {
        if let Some(value) = non_blank(self.env.var(ENV_PAT).as_deref()) {
            return Picked {
                value: Some(value),
                source: CredentialSource::Env,
            };
        }
        if let Some(value) = non_blank(stored.pat.as_deref()) {
            return Picked {
                value: Some(value),
                source: CredentialSource::Config,
            };
        }
        Picked {
            value: None,
            source: CredentialSource::Prompt,
        }
    }

    fn prompt_organization(&self) -> Result<String, CredentialError> {
        let entered = self.console.prompt_line(ORG_PROMPT)?;
        non_blank(Some(&entered)).ok_or(CredentialError::Domain(AuthDomainError::EmptyOrganization))
    }

    fn prompt_token(&self) -> Result<String, CredentialError> {
        let entered = self.console.prompt_secret(TOKEN_PROMPT)?;
        non_blank(Some(&entered)).ok_or(CredentialError::Domain(AuthDomainError::EmptyToken))
    }

    fn persist(&self, org_input: &str, token: &str) -> Result<(), CredentialError> {
        StoredConfig::merge_into(
            &self.config_path,
            StoredConfig {
                org: Some(org_input.to_owned()),
                pat: Some(token.to_owned()),
                ..StoredConfig::default()
            },
        )?;
        Ok(())
    }
}

/// Returns the trimmed value when it is non-empty.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}
