//! Resolved credential values threaded into orchestration calls.

use super::OrganizationUrl;

/// Where a credential value was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Supplied on the command line.
    Flag,
    /// Read from an environment variable.
    Env,
    /// Read from the stored configuration file.
    Config,
    /// Entered at an interactive prompt.
    Prompt,
}

impl CredentialSource {
    /// Returns the lowercase display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Config => "config",
            Self::Prompt => "prompt",
        }
    }
}

/// Credentials resolved for a single command invocation.
///
/// Resolved once per command and passed into each orchestration call as an
/// explicit value. The auth-retry service may replace the token exactly
/// once; nothing is cached beyond the process.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    organization_input: String,
    organization_url: OrganizationUrl,
    token: String,
    org_source: CredentialSource,
    token_source: CredentialSource,
}

impl ResolvedCredentials {
    /// Creates a resolved credential set.
    #[must_use]
    pub const fn new(
        organization_input: String,
        organization_url: OrganizationUrl,
        token: String,
        org_source: CredentialSource,
        token_source: CredentialSource,
    ) -> Self {
        Self {
            organization_input,
            organization_url,
            token,
            org_source,
            token_source,
        }
    }

    /// Returns the organization exactly as the user supplied it.
    #[must_use]
    pub fn organization_input(&self) -> &str {
        &self.organization_input
    }

    /// Returns the normalized organization endpoint.
    #[must_use]
    pub const fn organization_url(&self) -> &OrganizationUrl {
        &self.organization_url
    }

    /// Returns the personal access token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns where the organization value came from.
    #[must_use]
    pub const fn org_source(&self) -> CredentialSource {
        self.org_source
    }

    /// Returns where the token came from.
    #[must_use]
    pub const fn token_source(&self) -> CredentialSource {
        self.token_source
    }

    /// Returns these credentials with a prompt-supplied replacement token.
    #[must_use]
    pub fn with_replacement_token(self, token: String) -> Self {
        Self {
            token,
            token_source: CredentialSource::Prompt,
            ..self
        }
    }
}
