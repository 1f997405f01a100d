// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations: named, timed units of work carrying an item bag
//!
//! Lifecycle: `Created -> Started -> Disposed`. Starting twice is a no-op,
//! disposing twice is an error, and every other call on a disposed operation
//! fails. Whether the operation is observed is decided once, at creation;
//! an unobserved operation still times its span but never writes events.

use crate::error::{Result, UsageError};
use crate::items::{ItemBag, WithItem};
use crate::shape::{Reflect, Shape};
use crate::source::DiagnosticSource;
use crate::span::Span;
use crate::types::TypeKey;
use std::any::Any;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

/// Error stored under the common error identity
pub type SharedError = Arc<dyn Error + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationState {
    Created,
    Started,
    Disposed,
}

/// How a child operation gets its items
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChildItems {
    /// Same bag as the parent; additions are visible to both
    #[default]
    Share,
    /// Shallow copy of the parent's bag
    Copy,
    /// A fresh, empty bag
    Empty,
}

struct OperationInner {
    name: String,
    source: DiagnosticSource,
    items: ItemBag,
    observed: bool,
    span_id: String,
    parent_span_id: Option<String>,
    state: Mutex<OperationState>,
    span: Mutex<Span>,
}

impl OperationInner {
    fn lock_state(&self) -> MutexGuard<'_, OperationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_span(&self) -> MutexGuard<'_, Span> {
        self.span.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn stop_span(&self) -> Result<()> {
        let now = self.source.clock().now();
        let mut span = self.lock_span();
        if self.observed {
            self.source.channel().stop_span(&mut span, now, &self.items)
        } else {
            span.stop(now);
            Ok(())
        }
    }
}

impl Drop for OperationInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if *state != OperationState::Started {
            return;
        }
        *state = OperationState::Disposed;
        if let Err(e) = self.stop_span() {
            tracing::warn!(operation = %self.name, error = %e, "failed to stop dropped operation");
        }
    }
}

/// A unit of work. Clones are handles to the same operation.
#[derive(Clone)]
pub struct Operation {
    inner: Arc<OperationInner>,
}

impl Operation {
    pub(crate) fn root(source: DiagnosticSource, name: &str) -> Self {
        Self::create(source, name.to_string(), ItemBag::new(), None)
    }

    fn create(
        source: DiagnosticSource,
        name: String,
        items: ItemBag,
        parent_span_id: Option<String>,
    ) -> Self {
        let observed = source.is_enabled(&name);
        let span_id = source.next_span_id();
        let span = Span::new(name.clone(), span_id.clone(), parent_span_id.clone());
        Self {
            inner: Arc::new(OperationInner {
                name,
                source,
                items,
                observed,
                span_id,
                parent_span_id,
                state: Mutex::new(OperationState::Created),
                span: Mutex::new(span),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether events of this operation reach the channel
    pub fn is_observed(&self) -> bool {
        self.inner.observed
    }

    pub fn state(&self) -> OperationState {
        *self.inner.lock_state()
    }

    pub fn span_id(&self) -> &str {
        &self.inner.span_id
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.inner.parent_span_id.as_deref()
    }

    /// Span duration, once stopped
    pub fn duration(&self) -> Option<Duration> {
        self.inner.lock_span().duration()
    }

    pub fn source(&self) -> &DiagnosticSource {
        &self.inner.source
    }

    /// The item bag, without the disposed check
    pub fn items(&self) -> &ItemBag {
        &self.inner.items
    }

    fn guard(&self) -> Result<()> {
        if *self.inner.lock_state() == OperationState::Disposed {
            return Err(UsageError::Disposed {
                operation: self.inner.name.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Start the span; observed operations announce `<name>.Start`
    pub fn start(&self) -> Result<()> {
        {
            let mut state = self.inner.lock_state();
            match *state {
                OperationState::Disposed => {
                    return Err(UsageError::Disposed {
                        operation: self.inner.name.clone(),
                    }
                    .into())
                }
                OperationState::Started => return Ok(()),
                OperationState::Created => *state = OperationState::Started,
            }
        }

        let now = self.inner.source.clock().now();
        let mut span = self.inner.lock_span();
        if self.inner.observed {
            self.inner
                .source
                .channel()
                .start_span(&mut span, now, &self.inner.items)
        } else {
            span.start(now);
            Ok(())
        }
    }

    /// Stop the span if it was started and mark the operation disposed
    pub fn dispose(&self) -> Result<()> {
        let previous = {
            let mut state = self.inner.lock_state();
            let previous = *state;
            if previous == OperationState::Disposed {
                return Err(UsageError::Disposed {
                    operation: self.inner.name.clone(),
                }
                .into());
            }
            *state = OperationState::Disposed;
            previous
        };

        if previous == OperationState::Started {
            self.inner.stop_span()?;
        }
        Ok(())
    }

    /// Write `event_name` with this operation as the payload, when observed
    pub fn fire_event(&self, event_name: &str) -> Result<()> {
        self.guard()?;
        if event_name.is_empty() {
            return Err(UsageError::EmptyEventName.into());
        }
        if self.inner.observed {
            self.inner.source.channel().write(event_name, self)?;
        }
        Ok(())
    }

    /// Write `<name>.Error` with the item bag as the payload, when observed.
    ///
    /// The error is stored both as `Arc<E>` and as [`SharedError`].
    pub fn fire_error<E>(&self, error: Option<E>) -> Result<()>
    where
        E: Error + Send + Sync + 'static,
    {
        if !self.error_observed()? {
            return Ok(());
        }
        if let Some(error) = error {
            store_error(&self.inner.items, error)?;
        }
        self.write_error()
    }

    /// Like [`Operation::fire_error`] for an error already behind the
    /// common identity; it is stored only as [`SharedError`]
    pub fn fire_error_shared(&self, error: Option<SharedError>) -> Result<()> {
        if !self.error_observed()? {
            return Ok(());
        }
        if let Some(error) = error {
            self.inner.items.add(error)?;
        }
        self.write_error()
    }

    fn error_observed(&self) -> Result<bool> {
        self.guard()?;
        Ok(self.inner.observed)
    }

    fn write_error(&self) -> Result<()> {
        let event = format!("{}.Error", self.inner.name);
        self.inner.source.channel().write(&event, &self.inner.items)
    }

    /// New operation under this one
    pub fn child(&self, name: &str, items: ChildItems, start: bool) -> Result<Operation> {
        self.guard()?;
        if name.is_empty() {
            return Err(UsageError::EmptyOperationName.into());
        }

        let items = match items {
            ChildItems::Share => self.inner.items.clone(),
            ChildItems::Copy => self.inner.items.copy(),
            ChildItems::Empty => ItemBag::new(),
        };
        let child = Self::create(
            self.inner.source.clone(),
            name.to_string(),
            items,
            Some(self.inner.span_id.clone()),
        );
        if start {
            child.start()?;
        }
        Ok(child)
    }

    /// Started child named `<name>Error`, sharing the bag, with `error` stored
    pub fn child_error<E>(&self, error: E) -> Result<Operation>
    where
        E: Error + Send + Sync + 'static,
    {
        self.child_error_with(error, true)
    }

    pub fn child_error_with<E>(&self, error: E, start: bool) -> Result<Operation>
    where
        E: Error + Send + Sync + 'static,
    {
        let child = self.child(&format!("{}Error", self.inner.name), ChildItems::Share, false)?;
        store_error(child.items(), error)?;
        if start {
            child.start()?;
        }
        Ok(child)
    }

    pub fn add_item<T: Any + Send + Sync>(&self, item: T) -> Result<()> {
        self.guard()?;
        self.inner.items.add(item)
    }

    pub fn try_get_item<T: Any + Clone>(&self) -> Result<Option<T>> {
        self.guard()?;
        Ok(self.inner.items.try_get::<T>())
    }

    pub fn try_get_item_by_key(&self, key: TypeKey) -> Result<Option<Arc<dyn Any + Send + Sync>>> {
        self.guard()?;
        Ok(self.inner.items.try_get_by_key(key))
    }

    pub fn get_or_create_item<T, F>(&self, create: F) -> Result<T>
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> T,
    {
        self.guard()?;
        Ok(self.inner.items.get_or_create(create))
    }

    /// Store one value under several identities
    pub fn with_item<T: Any + Clone + Send + Sync>(&self, item: T) -> Result<WithItem<'_, T>> {
        self.guard()?;
        Ok(self.inner.items.with(item))
    }
}

fn store_error<E>(items: &ItemBag, error: E) -> Result<()>
where
    E: Error + Send + Sync + 'static,
{
    let concrete = Arc::new(error);
    items.add(Arc::clone(&concrete))?;
    items.add(concrete as SharedError)
}

impl Reflect for Operation {
    fn describe() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::builder::<Operation>()
                .field("Name", |op: &Operation| op.name().to_string())
                .field("SpanId", |op: &Operation| op.span_id().to_string())
                .optional_field("ParentSpanId", |op: &Operation| {
                    op.parent_span_id().map(str::to_string)
                })
                .build()
        })
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .field("observed", &self.inner.observed)
            .field("span_id", &self.inner.span_id)
            .finish()
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
