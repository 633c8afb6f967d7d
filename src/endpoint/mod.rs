// src/endpoint/mod.rs
use std::fmt;

use tracing::warn;
use url::{Position, Url};

/// Protocols a listener can be bound on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Unix,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Unix => f.write_str("unix"),
        }
    }
}

// Custom error type for endpoint parsing
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint {0:?} has no scheme, please use the full url format (e.g. \"tcp://host:port\")")]
    MissingScheme(String),

    #[error("protocol {0:?} not supported")]
    UnsupportedProtocol(String),

    #[error("malformed endpoint {endpoint:?}: {source}")]
    Malformed {
        endpoint: String,
        source: url::ParseError,
    },
}

/// Parse a URL-shaped endpoint into a `(protocol, address)` pair.
///
/// `tcp://host:port` yields the `host:port` authority, `unix:///path` yields
/// the path. Pure function, no side effects.
pub fn parse_endpoint(endpoint: &str) -> Result<(Protocol, String), EndpointError> {
    // A bare `host:port` would tokenize as scheme `host`, so scheme presence
    // is decided by the `://` separator.
    if !endpoint.contains("://") {
        return Err(EndpointError::MissingScheme(endpoint.to_string()));
    }

    let url = Url::parse(endpoint).map_err(|source| EndpointError::Malformed {
        endpoint: endpoint.to_string(),
        source,
    })?;

    match url.scheme() {
        "tcp" => {
            let authority = &url[Position::BeforeHost..Position::AfterPort];
            Ok((Protocol::Tcp, authority.to_string()))
        }
        "unix" => Ok((Protocol::Unix, url.path().to_string())),
        other => Err(EndpointError::UnsupportedProtocol(other.to_string())),
    }
}

/// Parse an endpoint, retrying schemeless input under `fallback`.
///
/// A bare `host:port` or path is re-parsed as `{fallback}://{endpoint}`; a
/// successful retry logs a deprecation warning but returns the same value a
/// fully-qualified endpoint would. Any other failure, or a failed retry,
/// returns the original parse error.
pub fn parse_endpoint_with_fallback(
    endpoint: &str,
    fallback: Protocol,
) -> Result<(Protocol, String), EndpointError> {
    match parse_endpoint(endpoint) {
        Err(err @ EndpointError::MissingScheme(_)) => {
            let fallback_endpoint = format!("{fallback}://{endpoint}");
            match parse_endpoint(&fallback_endpoint) {
                Ok(resolved) => {
                    warn!(
                        endpoint,
                        suggested = %fallback_endpoint,
                        "bare endpoints are deprecated, please use the full url format"
                    );
                    Ok(resolved)
                }
                Err(_) => Err(err),
            }
        }
        result => result,
    }
}
