//! Hostname blocklist patterns.

use super::{WebhookGuardError, host, host::Host, rejection::Rejection};

/// Hostnames that are always refused, whatever they resolve to.
const BUILTIN_EXACT: &[&str] = &["localhost"];

/// Suffixes whose subdomains are always refused.
const BUILTIN_SUFFIXES: &[&str] = &["local", "internal", "lan", "localdomain"];

/// Domain pattern for the hostname blocklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    /// Match apex domain and all subdomains ("**.example.com").
    ApexAndSubdomains(String),

    /// Match only subdomains, not apex ("*.example.com").
    SubdomainsOnly(String),

    /// Match exact domain ("example.com").
    Exact(String),
}

impl DomainPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, WebhookGuardError> {
        let pattern = pattern.trim().trim_end_matches('.').to_lowercase();

        if pattern.is_empty() {
            return Err(WebhookGuardError::InvalidPattern(
                "empty pattern".to_string(),
            ));
        }

        if let Some(domain) = pattern.strip_prefix("**.") {
            return Self::checked(domain, "apex").map(DomainPattern::ApexAndSubdomains);
        }

        if let Some(domain) = pattern.strip_prefix("*.") {
            return Self::checked(domain, "subdomain").map(DomainPattern::SubdomainsOnly);
        }

        if pattern.contains('*') {
            return Err(WebhookGuardError::InvalidPattern(format!(
                "wildcards are only allowed as a leading '*.' or '**.': {}",
                pattern
            )));
        }

        Ok(DomainPattern::Exact(pattern))
    }

    fn checked(domain: &str, kind: &str) -> Result<String, WebhookGuardError> {
        if domain.is_empty() || domain.contains('*') {
            return Err(WebhookGuardError::InvalidPattern(format!(
                "invalid {} pattern: '{}'",
                kind, domain
            )));
        }
        Ok(domain.to_string())
    }

    /// Check if this pattern matches a candidate host name.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            DomainPattern::Exact(domain) => host::domain_eq(candidate, domain),
            DomainPattern::SubdomainsOnly(domain) => host::is_strict_subdomain(candidate, domain),
            DomainPattern::ApexAndSubdomains(domain) => {
                host::is_subdomain_or_equal(candidate, domain)
            }
        }
    }
}

impl std::fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainPattern::ApexAndSubdomains(d) => write!(f, "**.{}", d),
            DomainPattern::SubdomainsOnly(d) => write!(f, "*.{}", d),
            DomainPattern::Exact(d) => write!(f, "{}", d),
        }
    }
}

impl std::str::FromStr for DomainPattern {
    type Err = WebhookGuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The set of hostname patterns refused before any DNS lookup.
#[derive(Debug, Clone)]
pub struct HostnameBlocklist {
    patterns: Vec<DomainPattern>,
}

impl HostnameBlocklist {
    /// The built-in blocklist: `localhost` and the `.local`, `.internal`,
    /// `.lan` and `.localdomain` suffixes.
    pub fn builtin() -> Self {
        let exact = BUILTIN_EXACT
            .iter()
            .map(|name| DomainPattern::Exact((*name).to_string()));
        let suffixes = BUILTIN_SUFFIXES
            .iter()
            .map(|suffix| DomainPattern::SubdomainsOnly((*suffix).to_string()));

        Self {
            patterns: exact.chain(suffixes).collect(),
        }
    }

    /// The built-in blocklist extended with extra pattern strings.
    pub fn with_patterns(extra: &[String]) -> Result<Self, WebhookGuardError> {
        let mut blocklist = Self::builtin();
        for pattern_str in extra {
            blocklist.add(DomainPattern::parse(pattern_str)?);
        }
        Ok(blocklist)
    }

    /// Add a pattern.
    pub fn add(&mut self, pattern: DomainPattern) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    /// Get the active patterns.
    pub fn patterns(&self) -> &[DomainPattern] {
        &self.patterns
    }

    /// Check if a host name matches any pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(name))
    }

    /// Refuse a blocked host. IP literals are never matched here.
    pub fn check(&self, host: &Host) -> Result<(), Rejection> {
        match host {
            Host::Domain(name) if self.matches(name) => {
                Err(Rejection::BlockedHostname(name.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for HostnameBlocklist {
    fn default() -> Self {
        Self::builtin()
    }
}
