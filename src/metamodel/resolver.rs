//! Field reference resolution.
//!
//! Turns a selector closure into a checked [`AttributeRef`]. Descriptors are
//! validated once per entity type and every `(type, name)` pair is resolved once;
//! both results live in process-wide caches that builders read on every call.

use super::attribute::{Attribute, AttributeRef};
use super::entity::{Entity, EntityDescriptor, EntityKey};
use super::value::FieldValue;
use crate::error::{FluentQueryError, Result};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type HandleKey = (TypeId, &'static str);

static DESCRIPTORS: OnceLock<DashMap<TypeId, Arc<EntityDescriptor>>> = OnceLock::new();
static HANDLES: OnceLock<DashMap<HandleKey, AttributeRef>> = OnceLock::new();

/// Process-wide attribute resolver
pub struct AttributeResolver;

impl AttributeResolver {
    /// Validated descriptor of `E`, cached after the first call
    pub fn descriptor<E: Entity>() -> Result<Arc<EntityDescriptor>> {
        let descriptors = DESCRIPTORS.get_or_init(DashMap::new);
        if let Some(descriptor) = descriptors.get(&TypeId::of::<E>()) {
            return Ok(Arc::clone(descriptor.value()));
        }

        let descriptor = E::descriptor();
        descriptor.validate()?;
        if descriptor.name != E::NAME {
            return Err(FluentQueryError::entity_definition(
                E::NAME,
                format!("descriptor is named '{}'", descriptor.name),
            ));
        }

        let descriptor = descriptors
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Arc::new(descriptor));
        Ok(Arc::clone(descriptor.value()))
    }

    /// Resolves the attribute picked by `selector` on `E`'s fields
    pub fn resolve<E, V, F>(selector: F) -> Result<AttributeRef>
    where
        E: Entity,
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let handle = selector(&E::FIELDS);
        Self::resolve_handle(handle)
    }

    /// Resolves an already-selected handle
    pub fn resolve_handle<E: Entity, V: FieldValue>(handle: Attribute<E, V>) -> Result<AttributeRef> {
        let handles = HANDLES.get_or_init(DashMap::new);
        let key = (TypeId::of::<E>(), handle.name());
        if let Some(resolved) = handles.get(&key) {
            return Self::check_kind::<E, V>(*resolved);
        }

        let descriptor = Self::descriptor::<E>()?;
        let declared = descriptor.find(handle.name()).ok_or_else(|| {
            FluentQueryError::unresolvable_attribute(
                E::NAME,
                handle.name(),
                "not a declared attribute",
            )
        })?;

        let resolved = AttributeRef {
            entity: EntityKey::of::<E>(),
            name: declared.name,
            kind: declared.kind,
        };
        debug!(entity = E::NAME, attribute = resolved.name, "Resolved attribute handle");
        handles.insert(key, resolved);
        Self::check_kind::<E, V>(resolved)
    }

    /// Resolves a declared attribute by name, without a value type check
    pub fn resolve_name<E: Entity>(name: &str) -> Result<AttributeRef> {
        let descriptor = Self::descriptor::<E>()?;
        let declared = descriptor.find(name).ok_or_else(|| {
            FluentQueryError::unresolvable_attribute(E::NAME, name, "not a declared attribute")
        })?;
        Ok(AttributeRef {
            entity: EntityKey::of::<E>(),
            name: declared.name,
            kind: declared.kind,
        })
    }

    fn check_kind<E: Entity, V: FieldValue>(resolved: AttributeRef) -> Result<AttributeRef> {
        if resolved.kind != V::kind() {
            return Err(FluentQueryError::unresolvable_attribute(
                E::NAME,
                resolved.name,
                format!("declared as {} but selected as {}", resolved.kind, V::kind()),
            ));
        }
        Ok(resolved)
    }
}
