// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation spans
//!
//! A span is the timed part of an operation. It records start and stop
//! instants and mirrors itself into a `tracing` span.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Span {
    name: String,
    id: String,
    parent_id: Option<String>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    trace: tracing::Span,
}

impl Span {
    pub fn new(name: impl Into<String>, id: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_id,
            started_at: None,
            stopped_at: None,
            trace: tracing::Span::none(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// Start at `now`; a second start is ignored
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_some() {
            return;
        }
        self.started_at = Some(now);
        self.trace = tracing::info_span!(
            "operation",
            name = %self.name,
            id = %self.id,
            parent = ?self.parent_id,
        );
    }

    /// Stop at `now`; ignored unless running
    pub fn stop(&mut self, now: Instant) {
        if !self.is_running() {
            return;
        }
        self.stopped_at = Some(now);
        let elapsed_ms = self.duration().map_or(0, |d| d.as_millis());
        let _entered = self.trace.enter();
        tracing::debug!(
            elapsed_ms = u64::try_from(elapsed_ms).unwrap_or(u64::MAX),
            "operation stopped"
        );
    }

    /// Time between start and stop, once stopped
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => Some(stop.saturating_duration_since(start)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "span_tests.rs"]
mod tests;
