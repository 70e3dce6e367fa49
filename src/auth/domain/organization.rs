//! Normalized organization endpoint for the remote service.

use std::fmt;

use url::Url;

use super::AuthDomainError;

/// Host serving organization-scoped resources in the modern URL layout.
const MODERN_HOST: &str = "dev.azure.com";

/// Host suffix of the legacy per-organization subdomain layout.
const LEGACY_HOST_SUFFIX: &str = ".visualstudio.com";

/// Normalized service endpoint with the organization it implies.
///
/// A bare name such as `myorg` normalizes to `https://dev.azure.com/myorg`;
/// modern URLs are trimmed to the organization root; legacy
/// `<org>.visualstudio.com` hosts are preserved. The implied organization is
/// derived at construction time so downstream organization-match checks
/// never re-parse the endpoint.
///
/// # Examples
///
///     use workcycle::auth::domain::OrganizationUrl;
///
///     let url = OrganizationUrl::normalize("myorg").expect("valid");
///     assert_eq!(url.as_str(), "https://dev.azure.com/myorg");
///     assert_eq!(url.organization(), "myorg");
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationUrl {
    url: String,
    organization: String,
}

impl OrganizationUrl {
    /// Normalizes an organization name or URL into a service endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AuthDomainError`] when the value is empty, is not a valid
    /// https URL, or lacks the organization segment required by the modern
    /// URL layout.
    pub fn normalize(input: &str) -> Result<Self, AuthDomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuthDomainError::EmptyOrganization);
        }

        if !trimmed.contains("://") {
            let name = trimmed.trim_matches('/');
            if name.is_empty() {
                return Err(AuthDomainError::InvalidOrganizationName(trimmed.to_owned()));
            }
            return Ok(Self {
                url: format!("https://{MODERN_HOST}/{name}"),
                organization: name.to_owned(),
            });
        }

        let parsed = Url::parse(trimmed)
            .map_err(|_| AuthDomainError::InvalidOrganizationUrl(trimmed.to_owned()))?;
        if parsed.scheme() != "https" {
            return Err(AuthDomainError::NonHttpsOrganizationUrl);
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| AuthDomainError::InvalidOrganizationUrl(trimmed.to_owned()))?
            .to_ascii_lowercase();

        if host == MODERN_HOST {
            let organization = first_path_segment(&parsed)
                .ok_or(AuthDomainError::MissingOrganizationSegment)?;
            return Ok(Self {
                url: format!("https://{MODERN_HOST}/{organization}"),
                organization,
            });
        }

        if let Some(subdomain) = host.strip_suffix(LEGACY_HOST_SUFFIX)
            && !subdomain.is_empty()
        {
            return Ok(Self {
                url: format!("https://{host}"),
                organization: subdomain.to_owned(),
            });
        }

        let path = parsed.path().trim_end_matches('/');
        let origin = parsed.origin().ascii_serialization();
        let url = if path.is_empty() {
            origin
        } else {
            format!("{origin}{path}")
        };
        Ok(Self {
            url,
            organization: host,
        })
    }

    /// Returns the normalized endpoint URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the organization implied by the endpoint.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }
}

impl fmt::Display for OrganizationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Returns the first non-empty, percent-decoded path segment.
fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(|segment| {
            percent_encoding::percent_decode_str(segment)
                .decode_utf8_lossy()
                .into_owned()
        })
}
