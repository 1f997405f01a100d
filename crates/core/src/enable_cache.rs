// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event cache of "is anyone listening"
//!
//! A cached answer is trusted strictly before its expiration. At or after the
//! expiration the probe runs again and the expiration is pushed forward. A
//! TTL too large to add to the current instant never expires.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default time a probe result stays valid
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

type Probe = Box<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug)]
struct Entry {
    enabled: bool,
    /// `None` when `now + ttl` is past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Caches the answer of an injected probe per event name
pub struct EnableCache {
    probe: Probe,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl EnableCache {
    pub fn new(probe: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            ttl: DEFAULT_CACHE_TTL,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Answer for `event_name` as of `now`, probing when absent or expired.
    ///
    /// The check and the refresh happen under one lock, so concurrent callers
    /// never observe a half-written entry.
    pub fn is_enabled(&self, event_name: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = entries.get_mut(event_name) {
            if entry.is_fresh(now) {
                return entry.enabled;
            }
            entry.enabled = (self.probe)(event_name);
            entry.expires_at = now.checked_add(self.ttl);
            return entry.enabled;
        }

        let enabled = (self.probe)(event_name);
        entries.insert(
            event_name.to_string(),
            Entry {
                enabled,
                expires_at: now.checked_add(self.ttl),
            },
        );
        enabled
    }

    /// Drop every cached answer
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl std::fmt::Debug for EnableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("EnableCache")
            .field("ttl", &self.ttl)
            .field("entries", &entries.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "enable_cache_tests.rs"]
mod tests;
