// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolution and memoization of extraction functions
//!
//! Resolution order for a payload type `P` and requested type `T`, without a
//! property name:
//! 1. `P` is `T` (or declares a conversion to `T`): the payload itself
//! 2. `P` carries items (`Operation`, `ItemBag`): look `T` up in the items
//! 3. `T` is a registered adapter: populate it from `P`'s fields
//! 4. otherwise the first field of `P` assignable to `T`
//!
//! With a property name only the named field (or dotted path) is considered.
//! Compiled functions are cached process-wide per key and never invalidated.

use super::adapter;
use crate::error::{ConfigurationError, Result};
use crate::items::ItemBag;
use crate::operation::Operation;
use crate::shape::{FieldPath, Payload, Shape};
use crate::types::{self, BoxedValue, Conversion, TypeKey};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// A compiled, reusable extraction function
pub type Extractor<T> = Arc<dyn Fn(&dyn Payload) -> Option<T> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    payload: TypeKey,
    target: TypeKey,
    property: Option<String>,
}

type Compiled = Arc<dyn Any + Send + Sync>;

fn compiled() -> &'static RwLock<HashMap<CacheKey, Compiled>> {
    static COMPILED: OnceLock<RwLock<HashMap<CacheKey, Compiled>>> = OnceLock::new();
    COMPILED.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Extraction function for `T` from payloads shaped like `payload`
pub fn extractor<T>(payload: &dyn Payload, property: Option<&str>) -> Result<Extractor<T>>
where
    T: Any + Clone + Send + Sync,
{
    extractor_for_shape::<T>(payload.shape(), property)
}

/// Extraction function for `T` from payloads described by `shape`.
///
/// Concurrent first use may compile twice; the first function stored wins
/// and every caller receives it.
pub fn extractor_for_shape<T>(shape: &'static Shape, property: Option<&str>) -> Result<Extractor<T>>
where
    T: Any + Clone + Send + Sync,
{
    let key = CacheKey {
        payload: shape.key(),
        target: TypeKey::of::<T>(),
        property: property.map(str::to_string),
    };

    if let Some(found) = lookup::<T>(&key) {
        return Ok(found);
    }

    let fresh = compile::<T>(shape, property)?;
    tracing::debug!(
        payload = %key.payload,
        target = %key.target,
        property = ?key.property,
        "compiled argument extractor"
    );

    let mut cache = compiled().write().unwrap_or_else(|e| e.into_inner());
    let stored = cache
        .entry(key)
        .or_insert_with(|| Arc::new(Arc::clone(&fresh)) as Compiled);
    Ok(stored
        .downcast_ref::<Extractor<T>>()
        .cloned()
        .unwrap_or(fresh))
}

fn lookup<T: Any>(key: &CacheKey) -> Option<Extractor<T>> {
    compiled()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(key)
        .and_then(|c| c.downcast_ref::<Extractor<T>>().cloned())
}

fn compile<T>(shape: &'static Shape, property: Option<&str>) -> Result<Extractor<T>>
where
    T: Any + Clone + Send + Sync,
{
    let payload = shape.key();
    let target = TypeKey::of::<T>();

    let Some(property) = property else {
        if payload == target {
            return Ok(Arc::new(|p: &dyn Payload| p.downcast_ref::<T>().cloned()));
        }
        if let Some(convert) = types::conversion(payload, target) {
            return Ok(Arc::new(move |p: &dyn Payload| {
                unbox::<T>(convert(p.as_any()))
            }));
        }
        if payload == TypeKey::of::<Operation>() {
            return Ok(Arc::new(|p: &dyn Payload| {
                p.downcast_ref::<Operation>()
                    .and_then(|op| op.items().try_get::<T>())
            }));
        }
        if payload == TypeKey::of::<ItemBag>() {
            return Ok(Arc::new(|p: &dyn Payload| {
                p.downcast_ref::<ItemBag>().and_then(|bag| bag.try_get::<T>())
            }));
        }
        if let Some(spec) = adapter::lookup::<T>() {
            return adapter::compile(spec, shape, None);
        }

        let accessor = shape
            .first_assignable(target)
            .and_then(|field| Accessor::new(FieldPath::from(field.clone()), target))
            .ok_or_else(|| no_matching_field(payload, target, None))?;
        return Ok(accessor.into_extractor());
    };

    if let Some(spec) = adapter::lookup::<T>() {
        let via = shape
            .path(property)
            .ok_or_else(|| no_matching_field(payload, target, Some(property)))?;
        return adapter::compile(spec, shape, Some(via));
    }

    let accessor = Accessor::resolve(shape, property, target)
        .ok_or_else(|| no_matching_field(payload, target, Some(property)))?;
    Ok(accessor.into_extractor())
}

fn no_matching_field(payload: TypeKey, target: TypeKey, property: Option<&str>) -> ConfigurationError {
    ConfigurationError::NoMatchingField {
        payload_type: payload.name().to_string(),
        target_type: target.name().to_string(),
        property: property.map(str::to_string),
    }
}

fn unbox<T: Any>(value: Option<BoxedValue>) -> Option<T> {
    value
        .and_then(|boxed| boxed.downcast::<T>().ok())
        .map(|boxed| *boxed)
}

/// Reads one (possibly nested) field and converts it to a target type
#[derive(Clone)]
pub(crate) struct Accessor {
    path: FieldPath,
    convert: Option<Conversion>,
}

impl Accessor {
    /// `None` when the field's type is not assignable to `target`
    pub(crate) fn new(path: FieldPath, target: TypeKey) -> Option<Self> {
        let source = path.type_key();
        if source == target {
            return Some(Self {
                path,
                convert: None,
            });
        }
        types::conversion(source, target).map(|convert| Self {
            path,
            convert: Some(convert),
        })
    }

    /// Resolve a field name or dotted path on `shape`
    pub(crate) fn resolve(shape: &Shape, path: &str, target: TypeKey) -> Option<Self> {
        shape.path_to(path, target).and_then(|p| Self::new(p, target))
    }

    pub(crate) fn read(&self, root: &dyn Any) -> Option<BoxedValue> {
        let raw = self.path.read(root)?;
        match &self.convert {
            None => Some(raw),
            Some(convert) => convert(&*raw),
        }
    }

    fn into_extractor<T: Any + Clone + Send + Sync>(self) -> Extractor<T> {
        Arc::new(move |p: &dyn Payload| unbox::<T>(self.read(p.as_any())))
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
