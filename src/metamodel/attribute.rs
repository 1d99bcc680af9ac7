//! Typed attribute handles.
//!
//! An [`Attribute<E, V>`] names one attribute of entity `E` whose values are of type
//! `V`. Handles are plain data: they are declared once per entity on its fields
//! struct and handed to selector closures, so a selector can only produce an
//! attribute that exists on the entity with the value type the builder expects.

use super::entity::{Entity, EntityKey};
use super::value::{FieldValue, Value, ValueKind};
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Handle for attribute `name` of entity `E` with value type `V`
pub struct Attribute<E, V> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> Attribute<E, V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E, V> Clone for Attribute<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Attribute<E, V> {}

impl<E: Entity, V> fmt::Debug for Attribute<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute({}.{})", E::NAME, self.name)
    }
}

/// Untyped, resolved reference to a declared attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeRef {
    pub entity: EntityKey,
    pub name: &'static str,
    pub kind: ValueKind,
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity.name, self.name)
    }
}

/// Value of an association attribute: the identity of the referenced record
#[derive(Debug, Clone, PartialEq)]
pub struct Reference<E> {
    pub id: Value,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Reference<E> {
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            _marker: PhantomData,
        }
    }
}

impl<E: Entity> FieldValue for Reference<E> {
    fn kind() -> ValueKind {
        ValueKind::Association(E::NAME)
    }

    fn into_value(self) -> Value {
        self.id
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self::new(value.clone()))
    }
}

impl<E> From<Reference<E>> for Value {
    fn from(reference: Reference<E>) -> Self {
        reference.id
    }
}
