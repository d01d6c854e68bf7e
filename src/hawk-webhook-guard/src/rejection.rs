//! Rejection reasons and validation outcomes.

use std::net::IpAddr;

use serde::Serialize;
use thiserror::Error;

/// Why an endpoint was refused.
///
/// The `Display` text is the user-facing reason string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The input is not a URL with a host.
    #[error("Invalid webhook URL")]
    InvalidUrl,

    /// The scheme is neither http nor https.
    #[error("Webhook URL protocol must be http or https, got '{0}'")]
    UnsupportedProtocol(String),

    /// The port is not the scheme's default.
    #[error("Webhook port {port} is not allowed, only the default {scheme} port {default} may be used")]
    DisallowedPort {
        scheme: String,
        port: u16,
        default: u16,
    },

    /// The hostname is on the blocklist.
    #[error("Webhook hostname '{0}' is not allowed")]
    BlockedHostname(String),

    /// The host is a non-public IP literal.
    #[error("Webhook URL points to a private or reserved IP address: {0}")]
    PrivateIpLiteral(IpAddr),

    /// The hostname resolves to at least one non-public address.
    #[error("Webhook hostname '{host}' resolves to a private or reserved IP address: {addr}")]
    PrivateIpResolved { host: String, addr: IpAddr },

    /// Resolution failed, timed out or returned nothing.
    #[error("Cannot resolve webhook hostname '{host}'")]
    DnsResolutionFailure { host: String, detail: String },
}

impl Rejection {
    /// Get the taxonomy kind of this rejection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::InvalidUrl => RejectionKind::InvalidUrl,
            Rejection::UnsupportedProtocol(_) => RejectionKind::UnsupportedProtocol,
            Rejection::DisallowedPort { .. } => RejectionKind::DisallowedPort,
            Rejection::BlockedHostname(_) => RejectionKind::BlockedHostname,
            Rejection::PrivateIpLiteral(_) => RejectionKind::PrivateIpLiteral,
            Rejection::PrivateIpResolved { .. } => RejectionKind::PrivateIpResolved,
            Rejection::DnsResolutionFailure { .. } => RejectionKind::DnsResolutionFailure,
        }
    }
}

/// Stable classification of rejections, independent of message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// See [`Rejection::InvalidUrl`].
    InvalidUrl,
    /// See [`Rejection::UnsupportedProtocol`].
    UnsupportedProtocol,
    /// See [`Rejection::DisallowedPort`].
    DisallowedPort,
    /// See [`Rejection::BlockedHostname`].
    BlockedHostname,
    /// See [`Rejection::PrivateIpLiteral`].
    PrivateIpLiteral,
    /// See [`Rejection::PrivateIpResolved`].
    PrivateIpResolved,
    /// See [`Rejection::DnsResolutionFailure`].
    DnsResolutionFailure,
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RejectionKind::InvalidUrl => "invalid_url",
            RejectionKind::UnsupportedProtocol => "unsupported_protocol",
            RejectionKind::DisallowedPort => "disallowed_port",
            RejectionKind::BlockedHostname => "blocked_hostname",
            RejectionKind::PrivateIpLiteral => "private_ip_literal",
            RejectionKind::PrivateIpResolved => "private_ip_resolved",
            RejectionKind::DnsResolutionFailure => "dns_resolution_failure",
        };
        f.write_str(name)
    }
}

/// Result of validating one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// No obstruction found.
    Valid,

    /// The first failing check's rejection.
    Rejected(Rejection),
}

impl ValidationOutcome {
    /// Check if the endpoint was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Get the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Rejected(rejection) => Some(rejection),
        }
    }

    /// Get the user-facing reason, `None` when accepted.
    pub fn reason(&self) -> Option<String> {
        self.rejection().map(ToString::to_string)
    }
}

impl<T> From<Result<T, Rejection>> for ValidationOutcome {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(_) => ValidationOutcome::Valid,
            Err(rejection) => ValidationOutcome::Rejected(rejection),
        }
    }
}
