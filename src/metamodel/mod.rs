//! # Metamodel
//!
//! Domain-record contract, typed attribute handles, values and the field
//! reference resolver.

pub mod attribute;
pub mod entity;
pub mod resolver;
pub mod value;

pub use attribute::{Attribute, AttributeRef, Reference};
pub use entity::{AttributeDescriptor, Entity, EntityDescriptor, EntityKey, EntityType};
pub use resolver::AttributeResolver;
pub use value::{FieldValue, RecordValues, Value, ValueKind};
