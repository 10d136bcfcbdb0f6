// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for broker configuration
//!
//! Broker operations themselves never fail: an unknown key reads as empty and
//! a timed-out wait yields an empty batch.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a [`BrokerConfig`](crate::BrokerConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("wait_timeout must be greater than zero")]
    InvalidTimeout,
}
