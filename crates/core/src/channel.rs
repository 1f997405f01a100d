// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named event channels and the registry that announces them
//!
//! A channel is a broadcast point: producers write `(event name, payload)`,
//! subscribers receive the events their filter accepts. The registry tells
//! every channel listener about every channel, including the ones created
//! before the listener subscribed.

use crate::error::Result;
use crate::shape::Payload;
use crate::span::Span;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Receives the events written to a channel
pub trait EventSink: Send + Sync {
    fn on_event(&self, event_name: &str, payload: Option<&dyn Payload>) -> Result<()>;
}

impl<F> EventSink for F
where
    F: Fn(&str, Option<&dyn Payload>) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event_name: &str, payload: Option<&dyn Payload>) -> Result<()> {
        self(event_name, payload)
    }
}

type EventFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
struct Subscription {
    sink: Arc<dyn EventSink>,
    filter: EventFilter,
}

struct ChannelInner {
    name: String,
    subscriptions: RwLock<Vec<Subscription>>,
}

/// A named broadcast channel. Clones share subscribers.
#[derive(Clone)]
pub struct DiagnosticChannel {
    inner: Arc<ChannelInner>,
}

impl DiagnosticChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                name: name.into(),
                subscriptions: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True when some subscriber accepts `event_name`
    pub fn is_enabled(&self, event_name: &str) -> bool {
        self.inner
            .subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|s| (s.filter)(event_name))
    }

    /// Subscribe `sink` to the events accepted by `filter`
    pub fn subscribe(
        &self,
        sink: Arc<dyn EventSink>,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) {
        self.inner
            .subscriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscription {
                sink,
                filter: Arc::new(filter),
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Deliver an event to every accepting subscriber, in subscription
    /// order. The first subscriber error stops delivery and is returned.
    pub fn write(&self, event_name: &str, payload: &dyn Payload) -> Result<()> {
        let subscriptions = self
            .inner
            .subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for subscription in subscriptions {
            if (subscription.filter)(event_name) {
                subscription.sink.on_event(event_name, Some(payload))?;
            }
        }
        Ok(())
    }

    /// Start `span` and announce it as `<name>.Start`
    pub fn start_span(&self, span: &mut Span, now: Instant, payload: &dyn Payload) -> Result<()> {
        span.start(now);
        self.write(&format!("{}.Start", span.name()), payload)
    }

    /// Stop `span` and announce it as `<name>.Stop`
    pub fn stop_span(&self, span: &mut Span, now: Instant, payload: &dyn Payload) -> Result<()> {
        span.stop(now);
        self.write(&format!("{}.Stop", span.name()), payload)
    }
}

impl std::fmt::Debug for DiagnosticChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticChannel")
            .field("name", &self.inner.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Told about every channel a registry announces
pub trait ChannelListener: Send + Sync {
    fn on_channel(&self, channel: &DiagnosticChannel);
}

#[derive(Default)]
struct RegistryState {
    channels: Vec<DiagnosticChannel>,
    listeners: Vec<Arc<dyn ChannelListener>>,
}

/// Announces channels to listeners. Clones share state.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel and announce it to every listener
    pub fn create_channel(&self, name: impl Into<String>) -> DiagnosticChannel {
        let channel = DiagnosticChannel::new(name);
        let listeners = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.channels.push(channel.clone());
            state.listeners.clone()
        };
        for listener in listeners {
            listener.on_channel(&channel);
        }
        channel
    }

    /// Subscribe `listener`; existing channels are announced to it first.
    ///
    /// Each channel is announced to each listener exactly once.
    pub fn subscribe(&self, listener: Arc<dyn ChannelListener>) {
        let existing = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.listeners.push(Arc::clone(&listener));
            state.channels.clone()
        };
        for channel in &existing {
            listener.on_channel(channel);
        }
    }

    pub fn channels(&self) -> Vec<DiagnosticChannel> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .channels
            .clone()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("ChannelRegistry")
            .field("channels", &state.channels.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
