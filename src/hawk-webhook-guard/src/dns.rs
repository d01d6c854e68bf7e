//! DNS resolution gate.
//!
//! A hostname is only as safe as every address it resolves to. An attacker
//! who controls a domain can point it at a public address today and at
//! `169.254.169.254` tomorrow, so:
//!
//! - every returned address is classified, not just the first
//! - a failed, empty or timed-out lookup is a rejection, never a pass
//! - nothing is cached, each validation resolves afresh
//!
//! The resolver is injected through the [`Resolver`] trait so tests and
//! callers with their own DNS stack can replace the system resolver.

use std::collections::{HashMap, HashSet};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;

use super::ip_validation::is_private_ip;
use super::rejection::Rejection;

/// Resolves a hostname to its A and AAAA addresses.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a hostname. An empty list is treated as a failure by callers.
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the platform resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addr = format!("{}:0", host);
        let mut seen = HashSet::new();
        let ips = tokio::net::lookup_host(&addr)
            .await?
            .map(|socket_addr| socket_addr.ip())
            .filter(|ip| seen.insert(*ip))
            .collect();
        Ok(ips)
    }
}

/// Resolver answering from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// Create an empty resolver; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the addresses a host resolves to.
    pub fn with_host(
        mut self,
        host: impl Into<String>,
        addrs: impl IntoIterator<Item = IpAddr>,
    ) -> Self {
        self.entries
            .entry(host.into().to_lowercase())
            .or_default()
            .extend(addrs);
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.entries
            .get(&host.to_lowercase())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no records for {}", host))
            })
    }
}

/// Result of DNS resolution check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsCheckResult {
    /// All resolved IPs are public.
    Safe(Vec<IpAddr>),

    /// At least one resolved IP is non-public.
    NonPublicIp(IpAddr),

    /// DNS resolution failed, timed out or returned nothing.
    ResolutionFailed(String),
}

impl DnsCheckResult {
    /// Convert into the rejection for `host`, or the vetted addresses.
    pub fn into_result(self, host: &str) -> Result<Vec<IpAddr>, Rejection> {
        match self {
            DnsCheckResult::Safe(ips) => Ok(ips),
            DnsCheckResult::NonPublicIp(addr) => Err(Rejection::PrivateIpResolved {
                host: host.to_string(),
                addr,
            }),
            DnsCheckResult::ResolutionFailed(detail) => Err(Rejection::DnsResolutionFailure {
                host: host.to_string(),
                detail,
            }),
        }
    }
}

/// Resolve a hostname within `timeout` and check every returned address.
pub async fn check_dns_resolution(
    resolver: &dyn Resolver,
    host: &str,
    timeout: Duration,
) -> DnsCheckResult {
    let addrs = match tokio::time::timeout(timeout, resolver.resolve(host)).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(e)) => {
            tracing::warn!("DNS resolution failed for {}: {}", host, e);
            return DnsCheckResult::ResolutionFailed(e.to_string());
        }
        Err(_) => {
            tracing::warn!("DNS resolution for {} timed out after {:?}", host, timeout);
            return DnsCheckResult::ResolutionFailed(format!("timed out after {:?}", timeout));
        }
    };

    if addrs.is_empty() {
        return DnsCheckResult::ResolutionFailed("No addresses returned".to_string());
    }

    if let Some(ip) = addrs.iter().copied().find(|ip| is_private_ip(*ip)) {
        return DnsCheckResult::NonPublicIp(ip);
    }

    DnsCheckResult::Safe(addrs)
}

/// Re-check the peer of an established connection.
///
/// Delivery code calls this after connecting, so a DNS answer that changed
/// between validation and delivery is still caught.
pub fn verify_peer_ip(host: &str, peer: SocketAddr) -> Result<(), Rejection> {
    if is_private_ip(peer.ip()) {
        return Err(Rejection::PrivateIpResolved {
            host: host.to_string(),
            addr: peer.ip(),
        });
    }

    Ok(())
}
