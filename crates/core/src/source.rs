// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic sources: the producer side of one listener name
//!
//! A source owns its channel and the cache answering "is anyone listening
//! to this event", and creates the operations that write to the channel.

use crate::channel::{ChannelRegistry, DiagnosticChannel};
use crate::clock::{Clock, SystemClock};
use crate::config::DiagnosticsOptions;
use crate::enable_cache::{EnableCache, DEFAULT_CACHE_TTL};
use crate::error::{ConfigurationError, Result, UsageError};
use crate::id::{IdGen, UuidIdGen};
use crate::operation::Operation;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A producer type that declares the listener name of its events
pub trait ListenerNamed {
    fn listener_name() -> &'static str;
}

struct SourceInner {
    channel: DiagnosticChannel,
    cache: EnableCache,
    enabled: AtomicBool,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGen>,
}

/// Creates operations for one listener name. Clones share state.
#[derive(Clone)]
pub struct DiagnosticSource {
    inner: Arc<SourceInner>,
}

impl DiagnosticSource {
    pub fn new(registry: &ChannelRegistry, listener_name: &str) -> Result<Self> {
        SourceBuilder::new(listener_name).build(registry)
    }

    /// Source named after `T`'s declared listener name
    pub fn for_type<T: ListenerNamed>(registry: &ChannelRegistry) -> Result<Self> {
        let name = T::listener_name();
        if name.is_empty() {
            return Err(ConfigurationError::MissingListenerName {
                type_name: std::any::type_name::<T>().to_string(),
            }
            .into());
        }
        Self::new(registry, name)
    }

    pub fn builder(listener_name: &str) -> SourceBuilder {
        SourceBuilder::new(listener_name)
    }

    pub fn listener_name(&self) -> &str {
        self.inner.channel.name()
    }

    pub fn channel(&self) -> &DiagnosticChannel {
        &self.inner.channel
    }

    pub fn cache_ttl(&self) -> Duration {
        self.inner.cache.ttl()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Someone listens to `event_name` and the source is switched on
    pub fn is_enabled(&self, event_name: &str) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
            && self.inner.cache.is_enabled(event_name, self.inner.clock.now())
    }

    pub fn create_operation(&self, operation_name: &str) -> Result<Operation> {
        if operation_name.is_empty() {
            return Err(UsageError::EmptyOperationName.into());
        }
        Ok(Operation::root(self.clone(), operation_name))
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub(crate) fn next_span_id(&self) -> String {
        self.inner.ids.next()
    }
}

impl std::fmt::Debug for DiagnosticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSource")
            .field("listener_name", &self.listener_name())
            .field("enabled", &self.inner.enabled.load(Ordering::SeqCst))
            .field("cache", &self.inner.cache)
            .finish()
    }
}

/// Builder for [`DiagnosticSource`]
pub struct SourceBuilder {
    listener_name: String,
    cache_ttl: Duration,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGen>,
}

impl SourceBuilder {
    fn new(listener_name: &str) -> Self {
        Self {
            listener_name: listener_name.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGen),
        }
    }

    pub fn options(mut self, options: &DiagnosticsOptions) -> Self {
        self.cache_ttl = options.cache_ttl;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn id_gen(mut self, ids: impl IdGen + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Create the channel in `registry` and the source around it
    pub fn build(self, registry: &ChannelRegistry) -> Result<DiagnosticSource> {
        if self.listener_name.is_empty() {
            return Err(ConfigurationError::MissingListenerName {
                type_name: "<unnamed source>".to_string(),
            }
            .into());
        }

        let channel = registry.create_channel(self.listener_name);
        let probe = channel.clone();
        let cache = EnableCache::new(move |event| probe.is_enabled(event)).with_ttl(self.cache_ttl);

        Ok(DiagnosticSource {
            inner: Arc::new(SourceInner {
                channel,
                cache,
                enabled: AtomicBool::new(true),
                clock: self.clock,
                ids: self.ids,
            }),
        })
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
