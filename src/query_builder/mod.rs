//! # Query Builder System
//!
//! Type-safe construction of query and insert expression trees.
//!
//! ## Overview
//!
//! Builders accumulate projections, predicates, grouping, ordering and pagination
//! through selector closures over an entity's typed attribute handles, and freeze
//! the result with `build()`. Structural problems (foreign attributes, sub-queries
//! that do not project exactly one attribute, duplicate insert bindings) are
//! reported at the call that introduced them.
//!
//! ## Key Components
//!
//! - [`builder`] - `QueryBuilder`, the fluent entry point
//! - [`conditions`] - comparison, membership and ordering steps of the chain
//! - [`insert`] - `InsertBuilder` and `InsertTree`
//! - [`pagination`] - limit / offset windows
//! - [`tree`] - the expression tree handed to the translator
//!
//! ## Predicate Shape
//!
//! The first predicate becomes the root. Each further `and` / `or` grafts onto the
//! root left to right: the same connective extends the root group, a different one
//! wraps the current root as the first child of a new group. `and_group` /
//! `or_group` graft a closure's predicate as a single child for explicit grouping.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use fluent_query::query_builder::QueryBuilder;
//!
//! let mut query = QueryBuilder::<Account>::for_entity();
//! query
//!     .where_(|a| a.account_number)?.like("A%")
//!     .and(|a| a.customer)?.in_query::<Customer, _>(|q, account| {
//!         q.select(|c| c.id)?
//!             .where_(|c| c.name)?.like("t%")
//!             .and(|c| c.min_balance)?.le_outer(account.get(|a| a.balance)?)?;
//!         Ok(())
//!     })?
//!     .order_by(|a| a.id)?.asc();
//! let tree = query.build()?;
//! ```

pub mod builder;
pub mod conditions;
pub mod insert;
pub mod pagination;
pub mod tree;

pub use builder::QueryBuilder;
pub use conditions::{Condition, Correlated, OrderBy, Outer};
pub use insert::{Binding, InsertBuilder, InsertTree};
pub use pagination::Pagination;
pub use tree::{
    Comparison, Connective, CorrelatedRef, Direction, Operand, Operator, OrderClause, Predicate,
    QueryTree,
};

/// Reusable predicate-building function over entity `E`
///
/// Any `FnOnce(&mut QueryBuilder<E>) -> Result<()>` qualifies; this alias only
/// names the shape for signatures that store one.
pub type Specification<E> = Box<dyn FnOnce(&mut QueryBuilder<E>) -> crate::error::Result<()>>;
