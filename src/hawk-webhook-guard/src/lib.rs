//! Webhook endpoint validation with SSRF protection for Hawk notifications.
//!
//! Before a notification channel is saved, its delivery URL goes through a
//! fixed sequence of checks. The cheap, purely local checks run first; DNS
//! resolution is the only I/O and runs last.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WebhookValidator                          │
//! │                                                              │
//! │  parse URL ─► protocol/port ─► hostname blocklist            │
//! │                                      │                       │
//! │                     ┌────────────────┴───────────────┐       │
//! │                     ▼                                ▼       │
//! │            literal IP address               DNS resolution   │
//! │            (ip_validation)                  (dns::Resolver)  │
//! │                     │                                │       │
//! │                     └──────────► outcome ◄───────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first failing check wins and produces a [`Rejection`], whose
//! `Display` text is the reason shown to the user.
//!
//! # Example
//!
//! ```rust,ignore
//! use hawk_webhook_guard::validate_webhook_endpoint;
//!
//! match validate_webhook_endpoint("https://hooks.example.com/hawk").await {
//!     None => println!("endpoint accepted"),
//!     Some(reason) => println!("endpoint rejected: {reason}"),
//! }
//! ```

pub mod config;
pub mod dns;
pub mod host;
pub mod ip_validation;
pub mod pattern;
pub mod policy;
pub mod rejection;
pub mod validator;

pub use config::{GuardConfig, GuardConfigBuilder};
pub use dns::{
    DnsCheckResult, Resolver, StaticResolver, SystemResolver, check_dns_resolution,
    verify_peer_ip,
};
pub use host::Host;
pub use ip_validation::{
    IPV4_RULES, IPV6_RULES, Ipv4Range, Ipv6Range, classify, is_private, is_private_ip,
    strip_zone_id,
};
pub use pattern::{DomainPattern, HostnameBlocklist};
pub use policy::{check_protocol_and_port, default_port};
pub use rejection::{Rejection, RejectionKind, ValidationOutcome};
pub use validator::{ResolvedEndpoint, WebhookValidator, validate_webhook_endpoint};

use thiserror::Error;

/// Errors raised while building a validator.
///
/// Validation itself never fails with this type; it produces a
/// [`ValidationOutcome`] instead.
#[derive(Debug, Error)]
pub enum WebhookGuardError {
    /// Invalid blocklist pattern.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebhookGuardError>;
