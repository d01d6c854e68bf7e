//! Protocol and port policy.
//!
//! Only `http` and `https` are accepted, and only on their conventional
//! ports. An explicit port is fine as long as it equals the default.

use url::Url;

use super::rejection::Rejection;

/// Schemes a webhook may use, with the only port each may use.
const ALLOWED_SCHEMES: &[(&str, u16)] = &[("http", 80), ("https", 443)];

/// Get the default port of an allowed scheme.
pub fn default_port(scheme: &str) -> Option<u16> {
    ALLOWED_SCHEMES
        .iter()
        .find(|(allowed, _)| *allowed == scheme)
        .map(|(_, port)| *port)
}

/// Check the scheme and effective port of a parsed URL.
pub fn check_protocol_and_port(url: &Url) -> Result<(), Rejection> {
    let scheme = url.scheme();
    let default = default_port(scheme)
        .ok_or_else(|| Rejection::UnsupportedProtocol(scheme.to_string()))?;

    let port = url.port().unwrap_or(default);
    if port != default {
        return Err(Rejection::DisallowedPort {
            scheme: scheme.to_string(),
            port,
            default,
        });
    }

    Ok(())
}
