// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event observers: handlers grouped under one listener name

use crate::error::Result;
use crate::handler::EventHandler;
use crate::shape::Payload;

/// Receives the events of the channels named like its listener
pub trait EventObserver: Send + Sync {
    /// Channel name this observer subscribes to (compared case-insensitively)
    fn listener_name(&self) -> &str;

    /// Per-event filter used when subscribing
    fn is_enabled(&self, event_name: &str) -> bool;

    fn on_event(&self, event_name: &str, payload: Option<&dyn Payload>) -> Result<()>;
}

/// Observer dispatching events to a list of handlers
///
/// Enablement: an ignored name is never enabled; otherwise every name is
/// enabled while the allow list is empty, and only listed names after that.
pub struct HandlerObserver {
    listener_name: String,
    handlers: Vec<Box<dyn EventHandler>>,
    allowed: Vec<String>,
    ignored: Vec<String>,
}

impl HandlerObserver {
    pub fn new(listener_name: impl Into<String>) -> Self {
        Self {
            listener_name: listener_name.into(),
            handlers: Vec::new(),
            allowed: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// Add a handler; handlers for the same event run in the order added
    pub fn handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.add_handler(Box::new(handler));
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Restrict the enabled events to the allow list
    pub fn allow(mut self, event_name: impl Into<String>) -> Self {
        self.allowed.push(event_name.into());
        self
    }

    pub fn ignore(mut self, event_name: impl Into<String>) -> Self {
        self.ignored.push(event_name.into());
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl EventObserver for HandlerObserver {
    fn listener_name(&self) -> &str {
        &self.listener_name
    }

    fn is_enabled(&self, event_name: &str) -> bool {
        if self.ignored.iter().any(|n| n == event_name) {
            return false;
        }
        self.allowed.is_empty() || self.allowed.iter().any(|n| n == event_name)
    }

    fn on_event(&self, event_name: &str, payload: Option<&dyn Payload>) -> Result<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        for handler in &self.handlers {
            if handler.event_name() == event_name {
                handler.handle(payload)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for HandlerObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerObserver")
            .field("listener_name", &self.listener_name)
            .field("handlers", &self.handlers.len())
            .field("allowed", &self.allowed)
            .field("ignored", &self.ignored)
            .finish()
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
