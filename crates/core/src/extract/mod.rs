// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled argument extraction
//!
//! This module provides:
//! - `extractor` - resolve and cache a function `payload -> Option<T>`
//! - `ArgumentAdapter` - composite argument types populated field by field,
//!   optionally from several candidate payload shapes

mod adapter;
mod engine;

pub use adapter::{register_adapter, AdapterSpec, ArgumentAdapter, Binding, Candidate};
pub use engine::{extractor, extractor_for_shape, Extractor};
