//! Agent endpoint address value object.

use super::DirectoryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Addressing scheme of an agent endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointScheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
    /// Raw TCP carrying multiplexed frames.
    Tcp,
}

/// Validated network address of a capability agent.
///
/// HTTP(S) endpoints are used by the point-to-point transport; `tcp://`
/// endpoints are used by the multiplexed stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentEndpoint {
    raw: String,
    scheme: EndpointScheme,
    authority: String,
}

impl AgentEndpoint {
    /// Parses and validates an endpoint address.
    ///
    /// Trailing slashes are removed so paths can be appended uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidEndpoint`] when the value is not
    /// a URL with a host (and, for `tcp`, a port), or
    /// [`DirectoryDomainError::UnsupportedEndpointScheme`] for schemes other
    /// than `http`, `https` and `tcp`.
    pub fn parse(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().trim_end_matches('/').to_owned();
        let parsed = Url::parse(&normalized).map_err(|err| DirectoryDomainError::InvalidEndpoint {
            endpoint: raw.clone(),
            reason: err.to_string(),
        })?;

        let scheme = match parsed.scheme() {
            "http" => EndpointScheme::Http,
            "https" => EndpointScheme::Https,
            "tcp" => EndpointScheme::Tcp,
            other => return Err(DirectoryDomainError::UnsupportedEndpointScheme(other.to_owned())),
        };

        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| DirectoryDomainError::InvalidEndpoint {
                endpoint: raw.clone(),
                reason: "missing host".to_owned(),
            })?;

        let authority = match (scheme, parsed.port_or_known_default()) {
            (_, Some(port)) => format!("{host}:{port}"),
            (EndpointScheme::Tcp, None) => {
                return Err(DirectoryDomainError::InvalidEndpoint {
                    endpoint: raw,
                    reason: "tcp endpoints require a port".to_owned(),
                });
            }
            (_, None) => host.to_owned(),
        };

        Ok(Self {
            raw: normalized,
            scheme,
            authority,
        })
    }

    /// Returns the normalised endpoint string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the endpoint scheme.
    #[must_use]
    pub const fn scheme(&self) -> EndpointScheme {
        self.scheme
    }

    /// Returns `host:port` for this endpoint.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns whether the endpoint is reachable over HTTP(S).
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self.scheme, EndpointScheme::Http | EndpointScheme::Https)
    }

    /// Appends a path to an HTTP(S) endpoint.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.raw, path.trim_start_matches('/'))
    }
}

impl fmt::Display for AgentEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for AgentEndpoint {
    type Error = DirectoryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AgentEndpoint> for String {
    fn from(value: AgentEndpoint) -> Self {
        value.raw
    }
}
