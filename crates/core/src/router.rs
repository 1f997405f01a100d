// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener router: connects observers to the channels named after them

use crate::channel::{ChannelListener, ChannelRegistry, DiagnosticChannel, EventSink};
use crate::config::DiagnosticsOptions;
use crate::error::Result;
use crate::observer::{EventObserver, HandlerObserver};
use crate::shape::Payload;
use std::sync::Arc;

/// Forwards channel events to an observer
struct ObserverSink(Arc<dyn EventObserver>);

impl EventSink for ObserverSink {
    fn on_event(&self, event_name: &str, payload: Option<&dyn Payload>) -> Result<()> {
        self.0.on_event(event_name, payload)
    }
}

/// Subscribes each observer to every channel whose name matches its
/// listener name, ignoring ASCII case. Does nothing when disabled.
pub struct ListenerRouter {
    enabled: bool,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl ListenerRouter {
    pub fn new(options: &DiagnosticsOptions) -> Self {
        Self {
            enabled: options.enabled,
            observers: Vec::new(),
        }
    }

    /// Router with one handler observer, built by `build`
    pub fn with_handlers(
        listener_name: &str,
        build: impl FnOnce(HandlerObserver) -> HandlerObserver,
    ) -> Self {
        Self::with_options(&DiagnosticsOptions::default(), listener_name, build)
    }

    /// Like [`ListenerRouter::with_handlers`], honoring `options`
    pub fn with_options(
        options: &DiagnosticsOptions,
        listener_name: &str,
        build: impl FnOnce(HandlerObserver) -> HandlerObserver,
    ) -> Self {
        Self::new(options).observer(build(HandlerObserver::new(listener_name)))
    }

    pub fn observer(mut self, observer: impl EventObserver + 'static) -> Self {
        self.add_observer(Arc::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Subscribe to `registry`, including the channels it already has
    pub fn attach(self, registry: &ChannelRegistry) -> Arc<Self> {
        tracing::info!(
            enabled = self.enabled,
            observers = self.observers.len(),
            "attaching listener router"
        );
        let router = Arc::new(self);
        registry.subscribe(Arc::clone(&router) as Arc<dyn ChannelListener>);
        router
    }
}

impl ChannelListener for ListenerRouter {
    fn on_channel(&self, channel: &DiagnosticChannel) {
        if !self.enabled {
            return;
        }
        for observer in &self.observers {
            if !observer.listener_name().eq_ignore_ascii_case(channel.name()) {
                continue;
            }
            let filter = Arc::clone(observer);
            channel.subscribe(
                Arc::new(ObserverSink(Arc::clone(observer))),
                move |event_name| filter.is_enabled(event_name),
            );
            tracing::debug!(
                channel = channel.name(),
                listener = observer.listener_name(),
                "observer subscribed"
            );
        }
    }
}

impl std::fmt::Debug for ListenerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|o| o.listener_name()).collect();
        f.debug_struct("ListenerRouter")
            .field("enabled", &self.enabled)
            .field("observers", &names)
            .finish()
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
