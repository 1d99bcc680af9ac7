//! # Naming Convention
//!
//! Maps entity types to physical tables and attributes to physical columns.
//!
//! Mappings are derived once per entity type by [`NamingConvention::discover`] and
//! cached until explicitly invalidated. Physical names come from, in order of
//! precedence:
//!
//! 1. the setup-time [`NamingOverrides`] table
//! 2. names declared on the entity descriptor
//! 3. the configured [`NamingPolicy`]
//!
//! The cache is a `DashMap` and derivation runs while holding the entry for the
//! type, so concurrent discovery of one type yields exactly one mapping.

pub mod policy;

pub use policy::{NamingCase, NamingOverrides, NamingPolicy, TemplateNaming};

use crate::config::NamingConfig;
use crate::error::{FluentQueryError, Result};
use crate::logging::log_discovery;
use crate::metamodel::{AttributeRef, Entity, EntityKey, EntityType, ValueKind};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<NamingConvention> = OnceLock::new();

/// Physical column of one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub attribute: &'static str,
    pub kind: ValueKind,
    pub column: String,
    pub identity: bool,
}

/// Physical representation of one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    pub entity: EntityKey,
    pub table: String,
    pub columns: Vec<ColumnMapping>,
}

impl EntityMapping {
    pub fn column(&self, attribute: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.attribute == attribute)
    }

    pub fn identity(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.columns.iter().filter(|c| c.identity)
    }

    /// Attribute stored in `column`, compared case-insensitively
    pub fn attribute_for_column(&self, column: &str) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|c| c.column.eq_ignore_ascii_case(column))
    }
}

/// Entity type to physical name mapping with a discovery cache
#[derive(Debug)]
pub struct NamingConvention {
    policy: Arc<dyn NamingPolicy>,
    overrides: NamingOverrides,
    mappings: DashMap<TypeId, Arc<EntityMapping>>,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingConvention {
    pub fn new() -> Self {
        Self::with_policy(TemplateNaming::default())
    }

    pub fn with_policy(policy: impl NamingPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            overrides: NamingOverrides::default(),
            mappings: DashMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: NamingOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::with_policy(TemplateNaming::new(
            config.table_template.clone(),
            config.column_template.clone(),
            config.case,
        ))
        .with_overrides(config.overrides.clone())
    }

    /// Process-wide convention using the default policy
    pub fn global() -> &'static NamingConvention {
        GLOBAL.get_or_init(NamingConvention::new)
    }

    /// Derives and caches mappings for every type not yet cached
    pub fn discover(&self, entity_types: &[EntityType]) -> Result<()> {
        for entity_type in entity_types {
            self.discover_type(entity_type)?;
        }
        Ok(())
    }

    pub fn discover_entity<E: Entity>(&self) -> Result<Arc<EntityMapping>> {
        self.discover_type(&EntityType::of::<E>())
    }

    /// Cached mapping for the type, deriving it on first use
    pub fn discover_type(&self, entity_type: &EntityType) -> Result<Arc<EntityMapping>> {
        match self.mappings.entry(entity_type.key.type_id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let mapping = Arc::new(self.derive(entity_type)?);
                log_discovery(
                    entity_type.name(),
                    &mapping.table,
                    mapping.columns.len(),
                );
                entry.insert(Arc::clone(&mapping));
                Ok(mapping)
            }
        }
    }

    /// Drops the cached mapping; returns whether one was cached
    pub fn invalidate(&self, entity_type: &EntityType) -> bool {
        let removed = self.mappings.remove(&entity_type.key.type_id).is_some();
        if removed {
            debug!(entity = entity_type.name(), "Invalidated entity mapping");
        }
        removed
    }

    pub fn rediscover(&self, entity_type: &EntityType) -> Result<Arc<EntityMapping>> {
        self.invalidate(entity_type);
        self.discover_type(entity_type)
    }

    pub fn is_discovered(&self, entity: &EntityKey) -> bool {
        self.mappings.contains_key(&entity.type_id)
    }

    pub fn mapping(&self, entity: &EntityKey) -> Result<Arc<EntityMapping>> {
        self.mappings
            .get(&entity.type_id)
            .map(|mapping| Arc::clone(mapping.value()))
            .ok_or_else(|| FluentQueryError::unknown_entity(entity.name))
    }

    pub fn entity_name(&self, entity: &EntityKey) -> Result<String> {
        Ok(self.mapping(entity)?.table.clone())
    }

    pub fn column_name(&self, attribute: &AttributeRef) -> Result<String> {
        let mapping = self.mapping(&attribute.entity)?;
        mapping
            .column(attribute.name)
            .map(|c| c.column.clone())
            .ok_or_else(|| FluentQueryError::unknown_attribute(attribute.entity.name, attribute.name))
    }

    fn derive(&self, entity_type: &EntityType) -> Result<EntityMapping> {
        let descriptor = entity_type.descriptor();
        descriptor.validate()?;
        if descriptor.name != entity_type.name() {
            return Err(FluentQueryError::entity_definition(
                entity_type.name(),
                format!("descriptor is named '{}'", descriptor.name),
            ));
        }

        let entity = descriptor.name;
        let table = self
            .overrides
            .table_for(entity)
            .map(str::to_string)
            .or_else(|| descriptor.table.map(str::to_string))
            .unwrap_or_else(|| self.policy.table_name(entity));

        let columns = descriptor
            .attributes
            .iter()
            .map(|attribute| ColumnMapping {
                attribute: attribute.name,
                kind: attribute.kind,
                column: self
                    .overrides
                    .column_for(entity, attribute.name)
                    .map(str::to_string)
                    .or_else(|| attribute.column.map(str::to_string))
                    .unwrap_or_else(|| self.policy.column_name(entity, attribute.name)),
                identity: attribute.identity,
            })
            .collect();

        Ok(EntityMapping {
            entity: entity_type.key,
            table,
            columns,
        })
    }
}
