// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostics options
//!
//! ```toml
//! enabled = true
//! cache_ttl = "30s"
//! ```

use crate::enable_cache::DEFAULT_CACHE_TTL;
use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsOptions {
    /// Global switch for subscribing observers to channels
    pub enabled: bool,
    /// How long an "is anyone listening" answer is trusted
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl DiagnosticsOptions {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| {
            ConfigurationError::InvalidConfig {
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigurationError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
