//! # Error Types
//!
//! Structured error handling for query construction, translation and execution
//! using thiserror instead of `Box<dyn Error>` patterns.
//!
//! Construction-time errors (resolver, builders, tree invariants) are raised at the
//! offending call. Translation only fails when the naming convention lacks a mapping
//! for something the tree references. Execution failures keep the statement and its
//! parameters so a caller can decide whether a retry is safe.

use crate::metamodel::Value;
use thiserror::Error;

/// Boxed error surfaced by a persistence engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Comprehensive error type for the fluent query layer
#[derive(Error, Debug)]
pub enum FluentQueryError {
    #[error("Unresolvable attribute: {entity}.{attribute}: {reason}")]
    UnresolvableAttribute {
        entity: String,
        attribute: String,
        reason: String,
    },

    #[error("Unknown entity: {entity} has not been discovered by the naming convention")]
    UnknownEntity { entity: String },

    #[error("Unknown attribute: {entity}.{attribute} has no column mapping")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("Invalid query structure for {entity}{}: {message}", attribute_suffix(.attribute))]
    InvalidQueryStructure {
        entity: String,
        attribute: Option<String>,
        message: String,
    },

    #[error("Builder state error: {message}")]
    BuilderState { message: String },

    #[error("Row mapping error: {entity}.{attribute}: {message}")]
    RowMapping {
        entity: String,
        attribute: String,
        message: String,
    },

    #[error("Execution error: {source} (statement: {statement}, parameters: {parameters:?})")]
    Execution {
        statement: String,
        parameters: Vec<Value>,
        #[source]
        source: EngineError,
    },

    #[error("Invalid entity definition: {entity}: {message}")]
    EntityDefinition { entity: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl FluentQueryError {
    pub fn unresolvable_attribute(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnresolvableAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }

    pub fn unknown_attribute(entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
        }
    }

    /// Structural invariant violated on the tree itself
    pub fn invalid_structure(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQueryStructure {
            entity: entity.into(),
            attribute: None,
            message: message.into(),
        }
    }

    /// Structural invariant violated by one attribute of the tree
    pub fn invalid_attribute(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidQueryStructure {
            entity: entity.into(),
            attribute: Some(attribute.into()),
            message: message.into(),
        }
    }

    pub fn builder_state(message: impl Into<String>) -> Self {
        Self::BuilderState {
            message: message.into(),
        }
    }

    pub fn row_mapping(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RowMapping {
            entity: entity.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn execution(
        statement: impl Into<String>,
        parameters: Vec<Value>,
        source: impl Into<EngineError>,
    ) -> Self {
        Self::Execution {
            statement: statement.into(),
            parameters,
            source: source.into(),
        }
    }

    pub fn entity_definition(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EntityDefinition {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors raised while building a query, before any translation
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvableAttribute { .. }
                | Self::InvalidQueryStructure { .. }
                | Self::BuilderState { .. }
        )
    }
}

impl From<config::ConfigError> for FluentQueryError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

fn attribute_suffix(attribute: &Option<String>) -> String {
    attribute
        .as_deref()
        .map(|name| format!(".{name}"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, FluentQueryError>;
