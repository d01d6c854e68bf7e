//! Webhook guard configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Result, WebhookGuardError};

/// Default bound on a single DNS lookup.
pub const DEFAULT_DNS_TIMEOUT_MS: u64 = 5_000;

/// Configuration for the webhook validator.
///
/// Configuration can only tighten the policy: the built-in hostname
/// blocklist, the address rules and the protocol/port policy always apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Upper bound on DNS resolution, in milliseconds.
    pub dns_timeout_ms: u64,

    /// Extra hostname patterns to refuse (`name`, `*.suffix`, `**.domain`).
    pub blocked_hostnames: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            dns_timeout_ms: DEFAULT_DNS_TIMEOUT_MS,
            blocked_hostnames: Vec::new(),
        }
    }
}

impl GuardConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuration.
    pub fn builder() -> GuardConfigBuilder {
        GuardConfigBuilder::new()
    }

    /// Parse configuration from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| WebhookGuardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded webhook guard config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<()> {
        if self.dns_timeout_ms == 0 {
            return Err(WebhookGuardError::ConfigError(
                "dns_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the DNS timeout as a duration.
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }
}

/// Builder for GuardConfig.
#[derive(Debug, Default)]
pub struct GuardConfigBuilder {
    config: GuardConfig,
}

impl GuardConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: GuardConfig::new(),
        }
    }

    /// Set the DNS timeout.
    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.config.dns_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Add a blocked hostname pattern.
    pub fn block_hostname(mut self, pattern: impl Into<String>) -> Self {
        self.config.blocked_hostnames.push(pattern.into());
        self
    }

    /// Add multiple blocked hostname patterns.
    pub fn block_hostnames(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for pattern in patterns {
            self.config.blocked_hostnames.push(pattern.into());
        }
        self
    }

    /// Build the config.
    pub fn build(self) -> GuardConfig {
        self.config
    }
}
