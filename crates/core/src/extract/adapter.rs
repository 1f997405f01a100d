// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument adapters: composite arguments assembled from payload fields
//!
//! An adapter type declares, once, which of its fields are populated and
//! from where. A single-source adapter reads straight off the payload (or
//! off one of its nested fields). A multi-source adapter lists candidate
//! payload types and is populated from whichever candidate actually arrives.

use super::engine::{Accessor, Extractor};
use crate::error::{ConfigurationError, Result};
use crate::shape::{FieldPath, Payload, Reflect, Shape};
use crate::types::{BoxedValue, TypeKey};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// A type that can be requested as a handler argument and is populated
/// field by field from the payload.
///
/// ```ignore
/// impl ArgumentAdapter for Alpha {
///     fn adapter() -> AdapterSpec<Self> {
///         AdapterSpec::new()
///             .bind(Binding::new("name", |a: &mut Alpha, v: String| a.name = Some(v)))
///             .bind(Binding::new("value", |a: &mut Alpha, v: String| a.value = Some(v)))
///     }
/// }
/// ```
pub trait ArgumentAdapter: Any + Default + Clone + Send + Sync {
    fn adapter() -> AdapterSpec<Self>;
}

type Assign<A> = Arc<dyn Fn(&mut A, BoxedValue) + Send + Sync>;

/// One populated field of an adapter
pub struct Binding<A> {
    target: String,
    source: Option<String>,
    required: bool,
    ty: TypeKey,
    assign: Assign<A>,
}

impl<A: 'static> Binding<A> {
    /// Bind `target`, read from the same-named payload field, required
    pub fn new<V, F>(target: &str, assign: F) -> Self
    where
        V: Any + Send + Sync,
        F: Fn(&mut A, V) + Send + Sync + 'static,
    {
        let assign: Assign<A> = Arc::new(move |adapter: &mut A, value: BoxedValue| {
            if let Ok(value) = value.downcast::<V>() {
                assign(adapter, *value);
            }
        });
        Self {
            target: target.to_string(),
            source: None,
            required: true,
            ty: TypeKey::of::<V>(),
            assign,
        }
    }

    /// Read from another field name, or a dotted path (`User.Name`)
    pub fn source(mut self, path: &str) -> Self {
        self.source = Some(path.to_string());
        self
    }

    /// Leave the target unset when the source field does not exist
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source_path(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.target)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl<A> Clone for Binding<A> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            source: self.source.clone(),
            required: self.required,
            ty: self.ty,
            assign: Arc::clone(&self.assign),
        }
    }
}

impl<A> std::fmt::Debug for Binding<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.target)
            .field("source", &self.source)
            .field("required", &self.required)
            .field("type", &self.ty.name())
            .finish()
    }
}

/// A payload type a multi-source adapter accepts
#[derive(Clone, Copy)]
pub struct Candidate {
    key: TypeKey,
    shape: fn() -> &'static Shape,
}

impl Candidate {
    pub fn of<P: Reflect>() -> Self {
        Self {
            key: TypeKey::of::<P>(),
            shape: P::describe,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Candidate").field(&self.key.name()).finish()
    }
}

/// Declarative description of how to populate an adapter
pub struct AdapterSpec<A> {
    candidates: Option<Vec<Candidate>>,
    bindings: Vec<Binding<A>>,
    create: fn() -> A,
}

impl<A: Default + 'static> AdapterSpec<A> {
    /// A single-source adapter
    pub fn new() -> Self {
        Self {
            candidates: None,
            bindings: Vec::new(),
            create: A::default,
        }
    }

    /// A multi-source adapter accepting `candidates`, tested in order
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: Some(candidates),
            ..Self::new()
        }
    }
}

impl<A: Default + 'static> Default for AdapterSpec<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> AdapterSpec<A> {
    /// Append a candidate payload type (makes the adapter multi-source)
    pub fn candidate<P: Reflect>(mut self) -> Self {
        self.candidates
            .get_or_insert_with(Vec::new)
            .push(Candidate::of::<P>());
        self
    }

    pub fn bind(mut self, binding: Binding<A>) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn candidates(&self) -> Option<&[Candidate]> {
        self.candidates.as_deref()
    }

    pub fn bindings(&self) -> &[Binding<A>] {
        &self.bindings
    }
}

type Registered = Arc<dyn Any + Send + Sync>;

fn registry() -> &'static RwLock<HashMap<TypeKey, Registered>> {
    static ADAPTERS: OnceLock<RwLock<HashMap<TypeKey, Registered>>> = OnceLock::new();
    ADAPTERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Make `A` known to the extraction engine. Idempotent.
pub fn register_adapter<A: ArgumentAdapter>() {
    let key = TypeKey::of::<A>();
    if registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .contains_key(&key)
    {
        return;
    }

    let spec: Registered = Arc::new(Arc::new(A::adapter()));
    registry()
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .entry(key)
        .or_insert(spec);
}

pub(super) fn lookup<T: Any>() -> Option<Arc<AdapterSpec<T>>> {
    registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&TypeKey::of::<T>())
        .and_then(|r| r.downcast_ref::<Arc<AdapterSpec<T>>>().cloned())
}

/// A binding resolved against one concrete source shape
struct Resolved<A> {
    accessor: Accessor,
    assign: Assign<A>,
}

impl<A> Clone for Resolved<A> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            assign: Arc::clone(&self.assign),
        }
    }
}

/// Bindings resolved for one source type, ready to populate an adapter
struct Plan<A> {
    source: TypeKey,
    resolved: Vec<Resolved<A>>,
    create: fn() -> A,
}

impl<A> Plan<A> {
    fn resolve(spec: &AdapterSpec<A>, shape: &Shape) -> Result<Self>
    where
        A: 'static,
    {
        let mut resolved = Vec::with_capacity(spec.bindings.len());
        for binding in &spec.bindings {
            match Accessor::resolve(shape, binding.source_path(), binding.ty) {
                Some(accessor) => resolved.push(Resolved {
                    accessor,
                    assign: Arc::clone(&binding.assign),
                }),
                None if binding.required => {
                    return Err(ConfigurationError::RequiredFieldUnresolved {
                        adapter_type: std::any::type_name::<A>().to_string(),
                        field: binding.target.clone(),
                        source_path: binding.source_path().to_string(),
                        payload_type: shape.key().name().to_string(),
                    }
                    .into())
                }
                None => {}
            }
        }
        Ok(Self {
            source: shape.key(),
            resolved,
            create: spec.create,
        })
    }

    fn populate(&self, source: &dyn Payload) -> A {
        let mut adapter = (self.create)();
        let owner = source.as_any();
        for field in &self.resolved {
            if let Some(value) = field.accessor.read(owner) {
                (field.assign)(&mut adapter, value);
            }
        }
        adapter
    }
}

/// Compile the extraction function for adapter `T` over `shape`.
///
/// With `via`, the adapter is populated from the value of that (nested,
/// reflectable) field instead of from the payload itself.
pub(super) fn compile<T>(
    spec: Arc<AdapterSpec<T>>,
    shape: &'static Shape,
    via: Option<FieldPath>,
) -> Result<Extractor<T>>
where
    T: Any + Clone + Send + Sync,
{
    let payload = shape.key();
    let source_shape = match &via {
        None => shape,
        Some(path) => path.leaf().nested_shape().ok_or_else(|| {
            ConfigurationError::NotReflectable {
                payload_type: payload.name().to_string(),
                field: path.leaf().name().to_string(),
            }
        })?,
    };

    match spec.candidates() {
        None => {
            let plan = Plan::resolve(&spec, source_shape)?;
            Ok(Arc::new(move |p: &dyn Payload| {
                if p.type_key() != payload {
                    return None;
                }
                let source = select(p, via.as_ref())?;
                (source.type_key() == plan.source).then(|| plan.populate(source))
            }))
        }
        Some([]) => Err(ConfigurationError::EmptyCandidates {
            adapter_type: std::any::type_name::<T>().to_string(),
        }
        .into()),
        Some(candidates) => {
            let plans = candidates
                .iter()
                .map(|c| Plan::resolve(&spec, c.shape()))
                .collect::<Result<Vec<_>>>()?;
            let create = spec.create;
            Ok(Arc::new(move |p: &dyn Payload| {
                if p.type_key() != payload {
                    return None;
                }
                let Some(source) = select(p, via.as_ref()) else {
                    return Some(create());
                };
                let arrived = source.type_key();
                Some(
                    plans
                        .iter()
                        .find(|plan| plan.source == arrived)
                        .map_or_else(create, |plan| plan.populate(source)),
                )
            }))
        }
    }
}

fn select<'a>(payload: &'a dyn Payload, via: Option<&FieldPath>) -> Option<&'a dyn Payload> {
    match via {
        None => Some(payload),
        Some(path) => path.nested(payload.as_any()),
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
