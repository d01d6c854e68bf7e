//! Host normalization.

use std::net::IpAddr;

use url::Url;

/// A normalized webhook host: either a domain name or an IP literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Host {
    /// A domain name that must be resolved before it can be trusted.
    Domain(String),

    /// An IP literal, classified directly.
    Ip(IpAddr),
}

impl Host {
    /// Extract the host of a parsed URL, `None` when the URL has no host.
    pub fn from_url(url: &Url) -> Option<Self> {
        match url.host()? {
            url::Host::Ipv4(v4) => Some(Host::Ip(IpAddr::V4(v4))),
            url::Host::Ipv6(v6) => Some(Host::Ip(IpAddr::V6(v6))),
            url::Host::Domain(domain) => {
                let normalized = normalize_host(domain);
                if normalized.is_empty() {
                    None
                } else {
                    Some(Host::Domain(normalized))
                }
            }
        }
    }

    /// Get the IP literal, if this host is one.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Host::Ip(ip) => Some(*ip),
            Host::Domain(_) => None,
        }
    }

    /// Get the domain name, if this host is one.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Host::Domain(domain) => Some(domain),
            Host::Ip(_) => None,
        }
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Host::Domain(domain) => write!(f, "{}", domain),
            Host::Ip(ip) => write!(f, "{}", ip),
        }
    }
}

/// Normalize a domain name: lowercase, trailing dots removed.
///
/// The URL parser has already split off brackets, port and IP literals.
fn normalize_host(domain: &str) -> String {
    domain.trim().to_lowercase().trim_end_matches('.').to_string()
}

/// Check if one domain equals another (case-insensitive).
pub fn domain_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Check if candidate is a strict subdomain of domain (not equal).
pub fn is_strict_subdomain(candidate: &str, domain: &str) -> bool {
    let suffix = format!(".{}", domain.to_lowercase());
    candidate.to_lowercase().ends_with(&suffix)
}

/// Check if candidate is a subdomain or equal to domain.
pub fn is_subdomain_or_equal(candidate: &str, domain: &str) -> bool {
    domain_eq(candidate, domain) || is_strict_subdomain(candidate, domain)
}
