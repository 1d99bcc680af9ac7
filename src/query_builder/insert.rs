//! Single-row insert trees and their builder.

use crate::error::{FluentQueryError, Result};
use crate::metamodel::{
    Attribute, AttributeRef, AttributeResolver, Entity, EntityKey, FieldValue, Value,
};
use std::marker::PhantomData;

/// Ordered attribute bindings of one insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertTree {
    entity: EntityKey,
    bindings: Vec<(AttributeRef, Value)>,
}

impl InsertTree {
    fn new(entity: EntityKey) -> Self {
        Self {
            entity,
            bindings: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityKey {
        self.entity
    }

    /// Bindings in the order they were made
    pub fn bindings(&self) -> &[(AttributeRef, Value)] {
        &self.bindings
    }

    fn is_bound(&self, attribute: &AttributeRef) -> bool {
        self.bindings.iter().any(|(bound, _)| bound == attribute)
    }

    fn bind(&mut self, attribute: AttributeRef, value: Value) -> Result<()> {
        if attribute.entity != self.entity {
            return Err(FluentQueryError::invalid_attribute(
                self.entity.name,
                attribute.to_string(),
                format!("attribute belongs to {}", attribute.entity.name),
            ));
        }
        if self.is_bound(&attribute) {
            return Err(FluentQueryError::invalid_attribute(
                self.entity.name,
                attribute.name,
                "bound twice",
            ));
        }
        self.bindings.push((attribute, value));
        Ok(())
    }
}

/// Fluent construction of an [`InsertTree`]
#[derive(Debug)]
pub struct InsertBuilder<E: Entity> {
    tree: InsertTree,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> InsertBuilder<E> {
    /// Starts an insert into `E`'s table
    pub fn for_entity() -> Self {
        Self {
            tree: InsertTree::new(EntityKey::of::<E>()),
            _marker: PhantomData,
        }
    }

    /// Insert of every non-null attribute value of `record`, in descriptor order
    pub fn from_record(record: &E) -> Result<Self> {
        let mut builder = Self::for_entity();
        for (name, value) in record.to_values() {
            if value.is_null() {
                continue;
            }
            let attribute = AttributeResolver::resolve_name::<E>(name)?;
            builder.tree.bind(attribute, value)?;
        }
        Ok(builder)
    }

    /// Starts a binding; an attribute may be bound once
    pub fn value<V, F>(&mut self, selector: F) -> Result<Binding<'_, E, V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        if self.tree.is_bound(&attribute) {
            return Err(FluentQueryError::invalid_attribute(
                E::NAME,
                attribute.name,
                "bound twice",
            ));
        }
        Ok(Binding {
            builder: self,
            attribute,
            _marker: PhantomData,
        })
    }

    pub fn tree(&self) -> &InsertTree {
        &self.tree
    }

    pub fn build(self) -> Result<InsertTree> {
        if self.tree.bindings.is_empty() {
            return Err(FluentQueryError::invalid_structure(
                E::NAME,
                "at least one binding required",
            ));
        }
        Ok(self.tree)
    }
}

/// Pending binding of one attribute, completed by [`Binding::set`]
pub struct Binding<'a, E: Entity, V> {
    builder: &'a mut InsertBuilder<E>,
    attribute: AttributeRef,
    _marker: PhantomData<fn() -> V>,
}

impl<'a, E: Entity, V: FieldValue> Binding<'a, E, V> {
    pub fn set(self, value: impl Into<V>) -> &'a mut InsertBuilder<E> {
        let value: V = value.into();
        self.builder
            .tree
            .bindings
            .push((self.attribute, value.into_value()));
        self.builder
    }

    /// Binds SQL null
    pub fn set_null(self) -> &'a mut InsertBuilder<E> {
        self.builder.tree.bindings.push((self.attribute, Value::Null));
        self.builder
    }
}
