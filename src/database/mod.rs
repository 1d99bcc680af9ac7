//! # Execution Adapter
//!
//! Runs translated statements against a persistence engine and maps the raw
//! rows back into entities.
//!
//! ## Key Components
//!
//! - [`PersistenceEngine`] - async collaborator receiving statement text and parameters
//! - [`Dao`] - query, lookup and insert facade tying builder, translator and engine together
//! - [`map_row`] - reverse column mapping from a [`Row`] to an entity
//! - [`MemoryEngine`] - in-process engine interpreting the emitted statement subset
//! - `PgEngine` - PostgreSQL engine over a SQLx pool (`postgres` feature)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fluent_query::database::{Dao, MemoryEngine};
//! use fluent_query::metamodel::EntityType;
//! use fluent_query::naming::NamingConvention;
//! use fluent_query::test_helpers::Customer;
//! use std::sync::Arc;
//!
//! # async fn example() -> fluent_query::Result<()> {
//! let dao = Dao::new(MemoryEngine::new(), Arc::new(NamingConvention::new()));
//! dao.register(&[EntityType::of::<Customer>()])?;
//!
//! let mut query = dao.query::<Customer>();
//! query.where_(|c| c.name)?.like("t%");
//! let customers: Vec<Customer> = dao.list(&query.build()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod dao;
pub mod engine;
pub mod mapping;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use dao::Dao;
pub use engine::{PersistenceEngine, Row};
pub use mapping::map_row;
pub use memory::{MemoryEngine, MemoryEngineError};
#[cfg(feature = "postgres")]
pub use postgres::PgEngine;
