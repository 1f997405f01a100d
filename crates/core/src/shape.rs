// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload shapes: the readable fields of an event payload type
//!
//! A payload type describes itself once with a [`Shape`] built through
//! [`Shape::builder`]. The extraction layer reads that table to decide how a
//! requested argument can be produced from a payload, so producers and
//! observers never reference each other's concrete types.

use crate::types::{BoxedValue, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type that can describe its readable fields
pub trait Reflect: Any + Send + Sync {
    fn describe() -> &'static Shape;
}

/// Object-safe view of a reflectable value, as carried by events
pub trait Payload: Any + Send + Sync + 'static {
    fn shape(&self) -> &'static Shape;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Reflect> Payload for T {
    fn shape(&self) -> &'static Shape {
        T::describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Payload {
    /// Runtime type of the payload
    pub fn type_key(&self) -> TypeKey {
        self.shape().key()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type", &self.type_key().name())
            .finish()
    }
}

type ReadFn = Arc<dyn Fn(&dyn Any) -> Option<BoxedValue> + Send + Sync>;

/// Borrowing access from an owner to one of its reflectable sub-objects
trait NestedAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Payload>;
    fn shape(&self) -> &'static Shape;
}

struct RequiredNested<P, S> {
    get: fn(&P) -> &S,
}

impl<P: Any, S: Reflect> NestedAccess for RequiredNested<P, S> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Payload> {
        let owner = owner.downcast_ref::<P>()?;
        Some((self.get)(owner) as &dyn Payload)
    }

    fn shape(&self) -> &'static Shape {
        S::describe()
    }
}

struct OptionalNested<P, S> {
    get: fn(&P) -> Option<&S>,
}

impl<P: Any, S: Reflect> NestedAccess for OptionalNested<P, S> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Payload> {
        let owner = owner.downcast_ref::<P>()?;
        (self.get)(owner).map(|s| s as &dyn Payload)
    }

    fn shape(&self) -> &'static Shape {
        S::describe()
    }
}

/// One readable field of a payload type
#[derive(Clone)]
pub struct Field {
    name: String,
    ty: TypeKey,
    read: ReadFn,
    nested: Option<Arc<dyn NestedAccess>>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Read the field from its owner; `None` when the owner is of another
    /// type or an optional field is unset
    pub fn read(&self, owner: &dyn Any) -> Option<BoxedValue> {
        (self.read)(owner)
    }

    /// Shape of the field's value, when the value is itself reflectable
    pub fn nested_shape(&self) -> Option<&'static Shape> {
        self.nested.as_ref().map(|n| n.shape())
    }

    /// Borrow the field's value as a payload, when it is reflectable
    pub fn nested<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Payload> {
        self.nested.as_ref().and_then(|n| n.get(owner))
    }

    fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("nested", &self.nested.is_some())
            .finish()
    }
}

/// The ordered table of readable fields of one payload type
#[derive(Debug)]
pub struct Shape {
    key: TypeKey,
    fields: Vec<Field>,
}

impl Shape {
    pub fn builder<P: Any + Send + Sync>() -> ShapeBuilder<P> {
        ShapeBuilder {
            shape: Shape {
                key: TypeKey::of::<P>(),
                fields: Vec::new(),
            },
            _payload: std::marker::PhantomData,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First field with the given name, compared case-insensitively
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.matches_name(name))
    }

    /// First field, in declaration order, whose type is assignable to `target`
    pub fn first_assignable(&self, target: TypeKey) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.type_key().is_assignable_to(target))
    }

    /// Resolve a dotted path (`User.Name`) through nested fields
    pub fn path(&self, path: &str) -> Option<FieldPath> {
        self.walk(path, |_| true)
    }

    /// Like [`Shape::path`], but the last segment is the first field with
    /// that name whose type is assignable to `target`
    pub fn path_to(&self, path: &str, target: TypeKey) -> Option<FieldPath> {
        self.walk(path, |f| f.type_key().is_assignable_to(target))
    }

    fn walk(&self, path: &str, accept_leaf: impl Fn(&Field) -> bool) -> Option<FieldPath> {
        let mut hops = Vec::new();
        let mut shape = self;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                let leaf = shape
                    .fields
                    .iter()
                    .find(|f| f.matches_name(segment) && accept_leaf(f))?;
                return Some(FieldPath {
                    hops,
                    leaf: leaf.clone(),
                });
            }
            let nested = shape
                .fields
                .iter()
                .filter(|f| f.matches_name(segment))
                .find_map(|f| f.nested.clone())?;
            shape = nested.shape();
            hops.push(nested);
        }

        None
    }
}

/// A resolved, possibly nested, field of a shape
#[derive(Clone)]
pub struct FieldPath {
    hops: Vec<Arc<dyn NestedAccess>>,
    leaf: Field,
}

impl FieldPath {
    pub fn leaf(&self) -> &Field {
        &self.leaf
    }

    pub fn type_key(&self) -> TypeKey {
        self.leaf.type_key()
    }

    fn owner<'a>(&self, root: &'a dyn Any) -> Option<&'a dyn Any> {
        let mut current = root;
        for hop in &self.hops {
            current = hop.get(current)?.as_any();
        }
        Some(current)
    }

    pub fn read(&self, root: &dyn Any) -> Option<BoxedValue> {
        self.owner(root).and_then(|owner| self.leaf.read(owner))
    }

    pub fn nested<'a>(&self, root: &'a dyn Any) -> Option<&'a dyn Payload> {
        self.owner(root).and_then(|owner| self.leaf.nested(owner))
    }
}

impl From<Field> for FieldPath {
    fn from(leaf: Field) -> Self {
        Self {
            hops: Vec::new(),
            leaf,
        }
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPath")
            .field("depth", &self.hops.len())
            .field("leaf", &self.leaf)
            .finish()
    }
}

/// Builder for a [`Shape`]; fields keep their declaration order
pub struct ShapeBuilder<P> {
    shape: Shape,
    _payload: std::marker::PhantomData<fn(&P)>,
}

impl<P: Any + Send + Sync> ShapeBuilder<P> {
    /// A field that is always present
    pub fn field<V, F>(self, name: &str, get: F) -> Self
    where
        V: Any + Send + Sync,
        F: Fn(&P) -> V + Send + Sync + 'static,
    {
        self.optional_field(name, move |p: &P| Some(get(p)))
    }

    /// A field that may be unset on a given payload
    pub fn optional_field<V, F>(mut self, name: &str, get: F) -> Self
    where
        V: Any + Send + Sync,
        F: Fn(&P) -> Option<V> + Send + Sync + 'static,
    {
        let read: ReadFn = Arc::new(move |owner: &dyn Any| {
            owner
                .downcast_ref::<P>()
                .and_then(|p| get(p))
                .map(|v| Box::new(v) as BoxedValue)
        });
        self.shape.fields.push(Field {
            name: name.to_string(),
            ty: TypeKey::of::<V>(),
            read,
            nested: None,
        });
        self
    }

    /// A reflectable sub-object; adapters can read through it
    pub fn nested<S>(mut self, name: &str, get: fn(&P) -> &S) -> Self
    where
        S: Reflect + Clone,
    {
        let read: ReadFn = Arc::new(move |owner: &dyn Any| {
            owner
                .downcast_ref::<P>()
                .map(|p| Box::new(get(p).clone()) as BoxedValue)
        });
        self.shape.fields.push(Field {
            name: name.to_string(),
            ty: TypeKey::of::<S>(),
            read,
            nested: Some(Arc::new(RequiredNested { get })),
        });
        self
    }

    /// A reflectable sub-object that may be unset
    pub fn optional_nested<S>(mut self, name: &str, get: fn(&P) -> Option<&S>) -> Self
    where
        S: Reflect + Clone,
    {
        let read: ReadFn = Arc::new(move |owner: &dyn Any| {
            owner
                .downcast_ref::<P>()
                .and_then(|p| get(p))
                .map(|s| Box::new(s.clone()) as BoxedValue)
        });
        self.shape.fields.push(Field {
            name: name.to_string(),
            ty: TypeKey::of::<S>(),
            read,
            nested: Some(Arc::new(OptionalNested { get })),
        });
        self
    }

    pub fn build(self) -> Shape {
        self.shape
    }
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod tests;
