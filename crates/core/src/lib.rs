// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dx-core: named operations, events, and typed observers
//!
//! This crate provides:
//! - Operations with spans and type-keyed item bags
//! - Channels, observers, and a router connecting them by listener name
//! - Compiled, cached extraction of typed handler arguments from payloads
//! - Argument adapters populated from one or several payload shapes

pub mod clock;
pub mod id;

pub mod config;
pub mod error;

// Reflection and storage (order matters for dependencies)
pub mod types;
pub mod shape;
pub mod items;
pub mod enable_cache;
pub mod extract;

// Dispatch
pub mod handler;
pub mod observer;
pub mod channel;
pub mod router;

// Producers
pub mod span;
pub mod source;
pub mod operation;

// Re-exports
pub use channel::{ChannelListener, ChannelRegistry, DiagnosticChannel, EventSink};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::DiagnosticsOptions;
pub use enable_cache::{EnableCache, DEFAULT_CACHE_TTL};
pub use error::{ConfigurationError, DiagnosticsError, Result, UsageError};
pub use extract::{
    extractor, register_adapter, AdapterSpec, ArgumentAdapter, Binding, Candidate, Extractor,
};
pub use handler::{EventHandler, EventHandler0, EventHandler1, EventHandler2, EventHandler3};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use items::{ItemBag, WithItem};
pub use observer::{EventObserver, HandlerObserver};
pub use operation::{ChildItems, Operation, OperationState, SharedError};
pub use router::ListenerRouter;
pub use shape::{Field, FieldPath, Payload, Reflect, Shape, ShapeBuilder};
pub use source::{DiagnosticSource, ListenerNamed, SourceBuilder};
pub use span::Span;
pub use types::{register_conversion, TypeKey};
