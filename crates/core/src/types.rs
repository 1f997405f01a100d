// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime type identity and assignability
//!
//! Rust has no subtyping between concrete types, so "assignable" is defined
//! here as identity plus an explicit, process-wide table of conversions.
//! A conversion from `Arc<Concrete>` to `Arc<dyn Trait>` plays the role of an
//! interface, and a conversion from an enum to an integer plays the role of a
//! numeric narrowing.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, RwLock};

/// Identity of a type known at runtime
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True when a value of `self` can be used where `target` is expected
    pub fn is_assignable_to(&self, target: TypeKey) -> bool {
        *self == target || conversion(*self, target).is_some()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A value boxed for transport between type-erased layers
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// Type-erased conversion: reads a `&From` and produces a boxed `To`
pub type Conversion = Arc<dyn Fn(&dyn Any) -> Option<BoxedValue> + Send + Sync>;

fn conversions() -> &'static RwLock<HashMap<(TypeKey, TypeKey), Conversion>> {
    static CONVERSIONS: OnceLock<RwLock<HashMap<(TypeKey, TypeKey), Conversion>>> =
        OnceLock::new();
    CONVERSIONS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Declare that values of `From` may be used wherever `To` is requested.
///
/// The first registration for a pair wins; later ones are ignored.
pub fn register_conversion<From, To, F>(convert: F)
where
    From: Any + Clone + Send + Sync,
    To: Any + Send + Sync,
    F: Fn(From) -> To + Send + Sync + 'static,
{
    let key = (TypeKey::of::<From>(), TypeKey::of::<To>());
    let erased: Conversion = Arc::new(move |value: &dyn Any| {
        value
            .downcast_ref::<From>()
            .map(|from| Box::new(convert(from.clone())) as BoxedValue)
    });

    let mut table = conversions().write().unwrap_or_else(|e| e.into_inner());
    table.entry(key).or_insert(erased);
}

/// Look up the conversion from `from` to `target`, if one was declared
pub fn conversion(from: TypeKey, target: TypeKey) -> Option<Conversion> {
    conversions()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&(from, target))
        .cloned()
}

/// Convert a type-erased value of type `from` into `target`.
///
/// Identity is a clone-free pass through the caller; this only covers the
/// declared conversions.
pub fn convert(from: TypeKey, target: TypeKey, value: &dyn Any) -> Option<BoxedValue> {
    conversion(from, target).and_then(|f| f(value))
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
