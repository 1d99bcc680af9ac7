#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fluent Query
//!
//! Type-safe fluent query construction over attribute-bearing domain records.
//!
//! ## Overview
//!
//! Queries are described against entity types rather than tables. Attributes are
//! picked with selector closures over a per-entity struct of typed handles, so an
//! attribute that does not exist, or a value of the wrong type, is rejected by the
//! compiler. The resulting expression tree is translated into parameterized SQL
//! through a naming convention that maps logical names to physical ones.
//!
//! ## Architecture
//!
//! ```text
//! QueryBuilder / InsertBuilder  ->  QueryTree / InsertTree  ->  SqlTranslator
//!                                                                    |
//!        Entity  <-  map_row  <-  Row  <-  PersistenceEngine  <-  statement text + parameters
//! ```
//!
//! ## Module Organization
//!
//! - [`metamodel`] - entity contract, typed attribute handles, values and the resolver
//! - [`naming`] - logical-to-physical naming policy and discovery cache
//! - [`query_builder`] - fluent query and insert builders and their expression trees
//! - [`translation`] - deterministic SQL generation with placeholder styles
//! - [`database`] - persistence engines, row mapping and the DAO facade
//! - [`config`] - layered configuration
//! - [`logging`] - structured logging setup
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use fluent_query::metamodel::EntityType;
//! use fluent_query::naming::NamingConvention;
//! use fluent_query::query_builder::QueryBuilder;
//! use fluent_query::test_helpers::Customer;
//! use fluent_query::translation::SqlTranslator;
//!
//! # fn example() -> fluent_query::Result<()> {
//! let convention = NamingConvention::new();
//! convention.discover(&[EntityType::of::<Customer>()])?;
//!
//! let mut query = QueryBuilder::<Customer>::for_entity();
//! query.where_(|c| c.name)?.like("t%");
//! query.and(|c| c.region_code)?.eq(25);
//!
//! let statement = SqlTranslator::new(&convention).translate(&query.build()?)?;
//! assert_eq!(
//!     statement.text,
//!     "select e0.* from TB_CUSTOMER e0 where e0.DS_NAME like ? and e0.NU_REGION_CODE = ?"
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod metamodel;
pub mod naming;
pub mod query_builder;
pub mod test_helpers;
pub mod translation;

pub use config::{ConfigManager, DatabaseConfig, FluentQueryConfig, NamingConfig, TranslationConfig};
pub use database::{map_row, Dao, MemoryEngine, PersistenceEngine, Row};
#[cfg(feature = "postgres")]
pub use database::PgEngine;
pub use error::{FluentQueryError, Result};
pub use metamodel::{
    Attribute, AttributeResolver, Entity, EntityDescriptor, EntityType, Reference, Value,
};
pub use naming::NamingConvention;
pub use query_builder::{InsertBuilder, QueryBuilder, QueryTree};
pub use translation::{PlaceholderStyle, SqlTranslator, TranslatedStatement};
