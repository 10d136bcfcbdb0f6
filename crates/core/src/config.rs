// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How long an event stays deliverable after it is published
pub const DEFAULT_EVENT_TTL: Duration = Duration::from_secs(2 * 60);

/// How long a blocking get waits for a publish before returning empty
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for a [`Broker`](crate::Broker)
///
/// ```toml
/// event_ttl = "2m"
/// wait_timeout = "30s"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Age at which an event is swept from its key
    #[serde(with = "humantime_serde")]
    pub event_ttl: Duration,
    /// Deadline for a consumer parked in the wait registry
    #[serde(with = "humantime_serde")]
    pub wait_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            event_ttl: DEFAULT_EVENT_TTL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl BrokerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_ttl(mut self, ttl: Duration) -> Self {
        self.event_ttl = ttl;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Parse a config from TOML text; missing fields keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BrokerConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.wait_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
