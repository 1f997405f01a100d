// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handlers: an event name bound to a typed callback
//!
//! Each argument is extracted from the payload by a compiled function that
//! is resolved on first dispatch and kept on the handler. The callback runs
//! only when at least one argument was extracted.

use crate::error::{Result, UsageError};
use crate::extract::{extractor, register_adapter, ArgumentAdapter, Extractor};
use crate::shape::Payload;
use crate::types::TypeKey;
use std::any::Any;
use std::sync::RwLock;

/// Receives the payload of one named event
pub trait EventHandler: Send + Sync {
    fn event_name(&self) -> &str;

    /// Dispatch `payload`. Errors are configuration errors found while
    /// resolving how to extract the arguments.
    fn handle(&self, payload: &dyn Payload) -> Result<()>;
}

fn checked_name(event_name: &str) -> Result<String> {
    if event_name.is_empty() {
        return Err(UsageError::EmptyEventName.into());
    }
    Ok(event_name.to_string())
}

/// One extracted argument and the function resolved for it
struct Slot<T> {
    property: Option<String>,
    resolved: RwLock<Option<(TypeKey, Extractor<T>)>>,
}

impl<T: Any + Clone + Send + Sync> Slot<T> {
    fn new() -> Self {
        Self {
            property: None,
            resolved: RwLock::new(None),
        }
    }

    fn named(property: Option<&str>) -> Self {
        Self {
            property: property.map(str::to_string),
            ..Self::new()
        }
    }

    /// The resolved function is reused while payloads keep the same type
    fn extract(&self, payload: &dyn Payload) -> Result<Option<T>> {
        let key = payload.type_key();
        let cached = self
            .resolved
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|(resolved_for, _)| *resolved_for == key)
            .map(|(_, f)| f.clone());

        let extract = match cached {
            Some(f) => f,
            None => {
                let f = extractor::<T>(payload, self.property.as_deref())?;
                *self.resolved.write().unwrap_or_else(|e| e.into_inner()) = Some((key, f.clone()));
                f
            }
        };
        Ok(extract(payload))
    }
}

/// Handler without arguments; runs for every dispatch
pub struct EventHandler0 {
    event_name: String,
    callback: Box<dyn Fn() + Send + Sync>,
}

impl EventHandler0 {
    pub fn new(event_name: &str, callback: impl Fn() + Send + Sync + 'static) -> Result<Self> {
        Ok(Self {
            event_name: checked_name(event_name)?,
            callback: Box::new(callback),
        })
    }
}

impl EventHandler for EventHandler0 {
    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn handle(&self, _payload: &dyn Payload) -> Result<()> {
        (self.callback)();
        Ok(())
    }
}

/// Handler receiving one argument
pub struct EventHandler1<A> {
    event_name: String,
    callback: Box<dyn Fn(A) + Send + Sync>,
    arg: Slot<A>,
}

impl<A: Any + Clone + Send + Sync> EventHandler1<A> {
    pub fn new(event_name: &str, callback: impl Fn(A) + Send + Sync + 'static) -> Result<Self> {
        Ok(Self {
            event_name: checked_name(event_name)?,
            callback: Box::new(callback),
            arg: Slot::new(),
        })
    }

    /// Read the argument from the named payload field (or dotted path)
    pub fn with_property(mut self, property: &str) -> Self {
        self.arg = Slot::named(Some(property));
        self
    }
}

impl<A: ArgumentAdapter> EventHandler1<A> {
    /// Handler whose argument is an adapter; registers the adapter
    pub fn for_adapter(event_name: &str, callback: impl Fn(A) + Send + Sync + 'static) -> Result<Self> {
        register_adapter::<A>();
        Self::new(event_name, callback)
    }
}

impl<A: Any + Clone + Send + Sync> EventHandler for EventHandler1<A> {
    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn handle(&self, payload: &dyn Payload) -> Result<()> {
        if let Some(a) = self.arg.extract(payload)? {
            (self.callback)(a);
        }
        Ok(())
    }
}

/// Handler receiving two arguments, each possibly absent
pub struct EventHandler2<A, B> {
    event_name: String,
    callback: Box<dyn Fn(Option<A>, Option<B>) + Send + Sync>,
    args: (Slot<A>, Slot<B>),
}

impl<A, B> EventHandler2<A, B>
where
    A: Any + Clone + Send + Sync,
    B: Any + Clone + Send + Sync,
{
    pub fn new(
        event_name: &str,
        callback: impl Fn(Option<A>, Option<B>) + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self {
            event_name: checked_name(event_name)?,
            callback: Box::new(callback),
            args: (Slot::new(), Slot::new()),
        })
    }

    /// Field names per argument; `None` keeps type-based selection
    pub fn with_properties(mut self, first: Option<&str>, second: Option<&str>) -> Self {
        self.args = (Slot::named(first), Slot::named(second));
        self
    }

    /// Declare that one of the argument types is an adapter
    pub fn adapter<X: ArgumentAdapter>(self) -> Self {
        register_adapter::<X>();
        self
    }
}

impl<A, B> EventHandler for EventHandler2<A, B>
where
    A: Any + Clone + Send + Sync,
    B: Any + Clone + Send + Sync,
{
    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn handle(&self, payload: &dyn Payload) -> Result<()> {
        let a = self.args.0.extract(payload)?;
        let b = self.args.1.extract(payload)?;
        if a.is_some() || b.is_some() {
            (self.callback)(a, b);
        }
        Ok(())
    }
}

/// Handler receiving three arguments, each possibly absent
pub struct EventHandler3<A, B, C> {
    event_name: String,
    callback: Box<dyn Fn(Option<A>, Option<B>, Option<C>) + Send + Sync>,
    args: (Slot<A>, Slot<B>, Slot<C>),
}

impl<A, B, C> EventHandler3<A, B, C>
where
    A: Any + Clone + Send + Sync,
    B: Any + Clone + Send + Sync,
    C: Any + Clone + Send + Sync,
{
    pub fn new(
        event_name: &str,
        callback: impl Fn(Option<A>, Option<B>, Option<C>) + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self {
            event_name: checked_name(event_name)?,
            callback: Box::new(callback),
            args: (Slot::new(), Slot::new(), Slot::new()),
        })
    }

    pub fn with_properties(
        mut self,
        first: Option<&str>,
        second: Option<&str>,
        third: Option<&str>,
    ) -> Self {
        self.args = (Slot::named(first), Slot::named(second), Slot::named(third));
        self
    }

    /// Declare that one of the argument types is an adapter
    pub fn adapter<X: ArgumentAdapter>(self) -> Self {
        register_adapter::<X>();
        self
    }
}

impl<A, B, C> EventHandler for EventHandler3<A, B, C>
where
    A: Any + Clone + Send + Sync,
    B: Any + Clone + Send + Sync,
    C: Any + Clone + Send + Sync,
{
    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn handle(&self, payload: &dyn Payload) -> Result<()> {
        let a = self.args.0.extract(payload)?;
        let b = self.args.1.extract(payload)?;
        let c = self.args.2.extract(payload)?;
        if a.is_some() || b.is_some() || c.is_some() {
            (self.callback)(a, b, c);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
