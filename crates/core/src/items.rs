// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-keyed item bag carried by an operation
//!
//! Each type identity holds at most one value. Lookups try the exact type
//! first, then scan for a stored value with a declared conversion to the
//! requested type (see [`crate::types::register_conversion`]). When several
//! stored values convert to the same requested type, which one is returned is
//! unspecified; callers must avoid that ambiguity.

use crate::error::{ConfigurationError, Result};
use crate::shape::{Reflect, Shape};
use crate::types::{self, TypeKey};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

type SharedValue = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Item {
    key: TypeKey,
    value: SharedValue,
}

impl Item {
    fn convert_to(&self, target: TypeKey) -> Option<types::BoxedValue> {
        types::convert(self.key, target, &*self.value)
    }
}

/// Heterogeneous store of values, one per type
///
/// Cloning an `ItemBag` yields a handle to the same storage; use
/// [`ItemBag::copy`] for an independent shallow copy.
#[derive(Clone, Default)]
pub struct ItemBag {
    items: Arc<RwLock<HashMap<TypeKey, Item>>>,
}

impl ItemBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under its own type; fails if that type is taken
    pub fn add<T: Any + Send + Sync>(&self, value: T) -> Result<()> {
        self.insert(TypeKey::of::<T>(), Arc::new(value))
    }

    fn insert(&self, key: TypeKey, value: SharedValue) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        if items.contains_key(&key) {
            return Err(ConfigurationError::DuplicateItem {
                type_name: key.name().to_string(),
            }
            .into());
        }
        items.insert(key, Item { key, value });
        Ok(())
    }

    /// Exact-type lookup, falling back to a convertible stored value
    pub fn try_get<T: Any + Clone>(&self) -> Option<T> {
        let target = TypeKey::of::<T>();
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());

        if let Some(item) = items.get(&target) {
            return item.value.downcast_ref::<T>().cloned();
        }

        items
            .values()
            .find_map(|item| item.convert_to(target))
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Dynamic equivalent of [`ItemBag::try_get`]
    pub fn try_get_by_key(&self, key: TypeKey) -> Option<SharedValue> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());

        if let Some(item) = items.get(&key) {
            return Some(Arc::clone(&item.value));
        }

        items
            .values()
            .find_map(|item| item.convert_to(key))
            .map(SharedValue::from)
    }

    /// Return the stored `T`, or store and return the factory's value.
    ///
    /// The factory runs outside the lock and must not use this bag. If two
    /// callers race, the first stored value wins and both receive it.
    pub fn get_or_create<T, F>(&self, create: F) -> T
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> T,
    {
        let key = TypeKey::of::<T>();
        if let Some(existing) = self.exact::<T>(key) {
            return existing;
        }

        let created = create();
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        let item = items.entry(key).or_insert_with(|| Item {
            key,
            value: Arc::new(created.clone()),
        });
        item.value.downcast_ref::<T>().cloned().unwrap_or(created)
    }

    fn exact<T: Any + Clone>(&self, key: TypeKey) -> Option<T> {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .and_then(|item| item.value.downcast_ref::<T>().cloned())
    }

    /// Start registering one instance under several type identities
    pub fn with<T: Any + Clone + Send + Sync>(&self, item: T) -> WithItem<'_, T> {
        WithItem { bag: self, item }
    }

    /// Register `value` under every identity in `keys`
    pub fn register_as<T: Any + Clone + Send + Sync>(&self, value: T, keys: &[TypeKey]) -> Result<()> {
        let mut with = self.with(value);
        for key in keys {
            with = with.add_as_key(*key)?;
        }
        Ok(())
    }

    /// Independent shallow copy: same values, separate storage
    pub fn copy(&self) -> ItemBag {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        ItemBag {
            items: Arc::new(RwLock::new(items.clone())),
        }
    }

    /// True when both handles point at the same storage
    pub fn shares_storage_with(&self, other: &ItemBag) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ItemBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        f.debug_list()
            .entries(items.keys().map(|k| k.name()))
            .finish()
    }
}

impl Reflect for ItemBag {
    fn describe() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| Shape::builder::<ItemBag>().build())
    }
}

/// Builder that adds one instance under multiple type identities
pub struct WithItem<'a, T> {
    bag: &'a ItemBag,
    item: T,
}

impl<'a, T: Any + Clone + Send + Sync> WithItem<'a, T> {
    /// Add the instance under its own type
    pub fn add(self) -> Result<Self> {
        self.bag.add(self.item.clone())?;
        Ok(self)
    }

    /// Add the instance as `U`; requires a declared `T -> U` conversion
    pub fn add_as<U: Any + Send + Sync>(self) -> Result<Self> {
        self.add_as_key(TypeKey::of::<U>())
    }

    /// Add the instance under a dynamically chosen identity
    pub fn add_as_key(self, key: TypeKey) -> Result<Self> {
        let own = TypeKey::of::<T>();
        if key == own {
            return self.add();
        }

        let not_assignable = || ConfigurationError::NotAssignable {
            item_type: own.name().to_string(),
            target_type: key.name().to_string(),
        };
        let converted = types::convert(own, key, &self.item).ok_or_else(not_assignable)?;
        self.bag.insert(key, SharedValue::from(converted))?;
        Ok(self)
    }

    pub fn item(&self) -> &T {
        &self.item
    }
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
