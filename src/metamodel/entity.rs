//! Domain-record contract.
//!
//! A type participates in query construction by implementing [`Entity`]: it names
//! itself, exposes a fields struct of typed [`Attribute`](super::Attribute) handles,
//! and describes its attributes through a plain [`EntityDescriptor`]. Nothing here
//! depends on a reflection mechanism; the descriptor is the whole metadata source.

use super::value::{FieldValue, RecordValues, Value, ValueKind};
use crate::error::{FluentQueryError, Result};
use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Attribute-bearing domain record with identity
pub trait Entity: Sized + Send + Sync + 'static {
    /// Simple type name, the input to default table naming
    const NAME: &'static str;

    /// Struct of typed attribute handles handed to selector closures
    type Fields: Send + Sync + 'static;

    const FIELDS: Self::Fields;

    fn descriptor() -> EntityDescriptor;

    /// Attribute values in descriptor order
    fn to_values(&self) -> Vec<(&'static str, Value)>;

    fn from_values(values: &RecordValues) -> Result<Self>;
}

/// Stable identity of an entity type
#[derive(Clone, Copy)]
pub struct EntityKey {
    pub type_id: TypeId,
    pub name: &'static str,
}

impl EntityKey {
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::NAME,
        }
    }
}

impl PartialEq for EntityKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityKey {}

impl Hash for EntityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({})", self.name)
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Type-erased entity type, used to hand a set of types to discovery
#[derive(Clone, Copy, Debug)]
pub struct EntityType {
    pub key: EntityKey,
    describe: fn() -> EntityDescriptor,
}

impl EntityType {
    pub fn of<E: Entity>() -> Self {
        Self {
            key: EntityKey::of::<E>(),
            describe: E::descriptor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn descriptor(&self) -> EntityDescriptor {
        (self.describe)()
    }
}

/// Declared attributes of one entity, plus optional explicit physical names
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub table: Option<&'static str>,
    pub attributes: Vec<AttributeDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn find(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn identity(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.identity)
    }

    /// Checks the domain-record contract: at least one attribute, unique
    /// attribute names, and at least one identity attribute.
    pub fn validate(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(FluentQueryError::entity_definition(
                self.name,
                "no attributes declared",
            ));
        }

        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name) {
                return Err(FluentQueryError::entity_definition(
                    self.name,
                    format!("attribute '{}' declared more than once", attribute.name),
                ));
            }
        }

        if self.identity().next().is_none() {
            return Err(FluentQueryError::entity_definition(
                self.name,
                "no identity attribute declared",
            ));
        }

        Ok(())
    }
}

/// One declared attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub name: &'static str,
    pub kind: ValueKind,
    pub column: Option<&'static str>,
    pub identity: bool,
}

impl AttributeDescriptor {
    pub fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            column: None,
            identity: false,
        }
    }

    /// Descriptor whose kind is taken from the Rust value type
    pub fn of<V: FieldValue>(name: &'static str) -> Self {
        Self::new(name, V::kind())
    }

    pub fn with_column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub fn as_identity(mut self) -> Self {
        self.identity = true;
        self
    }
}
