//! Webhook endpoint validation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. parse the URL
//! 2. protocol and port
//! 3. hostname blocklist
//! 4. IP literal classification (literal hosts stop here)
//! 5. DNS resolution of every A/AAAA record
//!
//! Everything before step 5 is local, so obviously bad endpoints never
//! cause a DNS query.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::{
    Result,
    config::GuardConfig,
    dns::{Resolver, SystemResolver, check_dns_resolution},
    host::Host,
    ip_validation::is_private_ip,
    pattern::HostnameBlocklist,
    policy::check_protocol_and_port,
    rejection::{Rejection, ValidationOutcome},
};

/// An endpoint that passed validation, with the addresses that were vetted.
///
/// Delivery code can connect to `addrs` directly instead of resolving the
/// host again, which closes the window between validation and delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: Url,
    pub host: Host,
    pub addrs: Vec<SocketAddr>,
}

/// Validator for webhook delivery endpoints.
///
/// Holds no per-call state; share one instance across tasks.
#[derive(Clone)]
pub struct WebhookValidator {
    blocklist: HostnameBlocklist,
    resolver: Arc<dyn Resolver>,
    dns_timeout: Duration,
}

impl WebhookValidator {
    /// Create a validator with the built-in policy and the system resolver.
    pub fn new() -> Self {
        let config = GuardConfig::default();
        Self {
            blocklist: HostnameBlocklist::builtin(),
            resolver: Arc::new(SystemResolver),
            dns_timeout: config.dns_timeout(),
        }
    }

    /// Create a validator from config.
    pub fn with_config(config: GuardConfig) -> Result<Self> {
        config.validate()?;
        let blocklist = HostnameBlocklist::with_patterns(&config.blocked_hostnames)?;

        Ok(Self {
            blocklist,
            resolver: Arc::new(SystemResolver),
            dns_timeout: config.dns_timeout(),
        })
    }

    /// Replace the resolver.
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Get the hostname blocklist.
    pub fn blocklist(&self) -> &HostnameBlocklist {
        &self.blocklist
    }

    /// Get the DNS timeout.
    pub fn dns_timeout(&self) -> Duration {
        self.dns_timeout
    }

    /// Validate an endpoint.
    pub async fn validate(&self, endpoint: &str) -> ValidationOutcome {
        self.validate_and_resolve(endpoint).await.into()
    }

    /// Validate an endpoint and return the addresses it was checked against.
    pub async fn validate_and_resolve(
        &self,
        endpoint: &str,
    ) -> std::result::Result<ResolvedEndpoint, Rejection> {
        let result = self.run_checks(endpoint).await;

        match &result {
            Ok(resolved) => tracing::debug!(
                "Webhook endpoint accepted: host={} addrs={}",
                resolved.host,
                resolved.addrs.len()
            ),
            Err(rejection) => tracing::debug!(
                "Webhook endpoint rejected ({}): {}",
                rejection.kind(),
                rejection
            ),
        }

        result
    }

    async fn run_checks(&self, endpoint: &str) -> std::result::Result<ResolvedEndpoint, Rejection> {
        let url = Url::parse(endpoint.trim()).map_err(|_| Rejection::InvalidUrl)?;

        check_protocol_and_port(&url)?;

        let host = Host::from_url(&url).ok_or(Rejection::InvalidUrl)?;
        // The protocol check guarantees a known default port
        let port = url.port_or_known_default().ok_or(Rejection::InvalidUrl)?;

        self.blocklist.check(&host)?;

        let ips = match &host {
            Host::Ip(ip) => {
                if is_private_ip(*ip) {
                    return Err(Rejection::PrivateIpLiteral(*ip));
                }
                vec![*ip]
            }
            Host::Domain(name) => {
                check_dns_resolution(self.resolver.as_ref(), name, self.dns_timeout)
                    .await
                    .into_result(name)?
            }
        };

        let addrs = ips.into_iter().map(|ip| SocketAddr::new(ip, port)).collect();

        Ok(ResolvedEndpoint { url, host, addrs })
    }
}

impl Default for WebhookValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebhookValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookValidator")
            .field("blocklist", &self.blocklist)
            .field("dns_timeout", &self.dns_timeout)
            .finish_non_exhaustive()
    }
}

/// Validate a webhook endpoint with the default policy and system resolver.
///
/// Returns `None` when the endpoint is safe, otherwise the user-facing
/// rejection reason.
pub async fn validate_webhook_endpoint(endpoint: &str) -> Option<String> {
    WebhookValidator::new().validate(endpoint).await.reason()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticResolver;
    use crate::rejection::RejectionKind;

    fn ip(s: &str) -> std::net::IpAddr {
        s.parse().unwrap()
    }

    fn validator() -> WebhookValidator {
        let resolver = StaticResolver::new()
            .with_host("example.com", [ip("93.184.216.34")])
            .with_host("rebind.example", [ip("127.0.0.1")]);
        WebhookValidator::new().with_resolver(resolver)
    }

    async fn kind(endpoint: &str) -> Option<RejectionKind> {
        validator()
            .validate(endpoint)
            .await
            .rejection()
            .map(Rejection::kind)
    }

    #[tokio::test]
    async fn test_each_stage() {
        assert_eq!(kind("not-a-url").await, Some(RejectionKind::InvalidUrl));
        assert_eq!(kind("ftp://example.com/").await, Some(RejectionKind::UnsupportedProtocol));
        assert_eq!(kind("https://example.com:8443/").await, Some(RejectionKind::DisallowedPort));
        assert_eq!(kind("http://db.internal/").await, Some(RejectionKind::BlockedHostname));
        assert_eq!(kind("http://LocalHost./").await, Some(RejectionKind::BlockedHostname));
        assert_eq!(kind("http://10.1.2.3/").await, Some(RejectionKind::PrivateIpLiteral));
        assert_eq!(kind("http://rebind.example/").await, Some(RejectionKind::PrivateIpResolved));
        assert_eq!(kind("http://unknown.example/").await, Some(RejectionKind::DnsResolutionFailure));
        assert_eq!(kind("https://example.com/hook").await, None);
    }

    #[tokio::test]
    async fn test_resolved_addrs_carry_port() {
        let resolved = validator()
            .validate_and_resolve("https://example.com/hawk-webhook")
            .await
            .unwrap();

        assert_eq!(resolved.host, Host::Domain("example.com".to_string()));
        assert_eq!(resolved.addrs, vec![SocketAddr::new(ip("93.184.216.34"), 443)]);
        assert_eq!(resolved.url.path(), "/hawk-webhook");
    }

    #[tokio::test]
    async fn test_public_literal_skips_dns() {
        // The static resolver knows nothing about this address
        let resolved = validator()
            .validate_and_resolve("http://1.1.1.1/hook")
            .await
            .unwrap();

        assert_eq!(resolved.host, Host::Ip(ip("1.1.1.1")));
        assert_eq!(resolved.addrs, vec![SocketAddr::new(ip("1.1.1.1"), 80)]);
    }

    #[test]
    fn test_with_config_rejects_bad_pattern() {
        let config = GuardConfig::builder().block_hostname("a.*.b").build();
        assert!(WebhookValidator::with_config(config).is_err());
    }

    #[test]
    fn test_with_config() {
        let config = GuardConfig::builder()
            .dns_timeout(Duration::from_secs(2))
            .block_hostname("**.corp.example")
            .build();
        let validator = WebhookValidator::with_config(config).unwrap();

        assert_eq!(validator.dns_timeout(), Duration::from_secs(2));
        assert!(validator.blocklist().matches("wiki.corp.example"));
        assert!(validator.blocklist().matches("localhost"));
    }
}
