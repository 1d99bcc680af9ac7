use super::conditions::{Condition, OrderBy};
use super::pagination::Pagination;
use super::tree::{Connective, QueryTree};
use crate::error::{FluentQueryError, Result};
use crate::metamodel::{Attribute, AttributeResolver, Entity, EntityKey, FieldValue};
use std::marker::PhantomData;

/// Fluent construction of a [`QueryTree`] over entity `E`
///
/// ```rust,ignore
/// let mut query = QueryBuilder::<Customer>::for_entity();
/// query
///     .where_(|c| c.name)?.like("t%")
///     .and(|c| c.region_code)?.eq(25);
/// let tree = query.build()?;
/// ```
#[derive(Debug)]
pub struct QueryBuilder<E: Entity> {
    tree: QueryTree,
    deferred: Option<FluentQueryError>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> QueryBuilder<E> {
    /// Starts an outermost query over `E`
    pub fn for_entity() -> Self {
        Self::nested(0)
    }

    pub(crate) fn nested(depth: usize) -> Self {
        Self {
            tree: QueryTree::new(EntityKey::of::<E>(), depth),
            deferred: None,
            _marker: PhantomData,
        }
    }

    /// Appends a projected attribute; no projection selects every mapped attribute
    pub fn select<V, F>(&mut self, selector: F) -> Result<&mut Self>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        self.tree.add_projection(attribute)?;
        Ok(self)
    }

    /// Starts a comparison; on a builder that already has a predicate this conjoins
    pub fn where_<V, F>(&mut self, selector: F) -> Result<Condition<'_, E, V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        self.condition(Connective::And, selector)
    }

    pub fn and<V, F>(&mut self, selector: F) -> Result<Condition<'_, E, V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        self.condition(Connective::And, selector)
    }

    pub fn or<V, F>(&mut self, selector: F) -> Result<Condition<'_, E, V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        self.condition(Connective::Or, selector)
    }

    /// Applies a specification function at this point of the chain
    pub fn where_spec<S>(&mut self, spec: S) -> Result<&mut Self>
    where
        S: FnOnce(&mut Self) -> Result<()>,
    {
        spec(self)?;
        Ok(self)
    }

    pub fn and_spec<S>(&mut self, spec: S) -> Result<&mut Self>
    where
        S: FnOnce(&mut Self) -> Result<()>,
    {
        self.where_spec(spec)
    }

    /// Conjoins the predicate built by `group` as one parenthesized child
    pub fn and_group<G>(&mut self, group: G) -> Result<&mut Self>
    where
        G: FnOnce(&mut Self) -> Result<()>,
    {
        self.group(Connective::And, group)
    }

    /// Disjoins the predicate built by `group` as one parenthesized child
    pub fn or_group<G>(&mut self, group: G) -> Result<&mut Self>
    where
        G: FnOnce(&mut Self) -> Result<()>,
    {
        self.group(Connective::Or, group)
    }

    /// Appends an ordering key; keys sort in call order
    pub fn order_by<V, F>(&mut self, selector: F) -> Result<OrderBy<'_, E>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        Ok(OrderBy::new(self, attribute))
    }

    pub fn group_by<V, F>(&mut self, selector: F) -> Result<&mut Self>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        self.tree.add_grouping(attribute)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.tree.set_limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.tree.set_offset(offset);
        self
    }

    /// Window for a 1-indexed page
    pub fn paginate(&mut self, page: u64, per_page: u64) -> Result<&mut Self> {
        if page == 0 || per_page == 0 {
            return Err(FluentQueryError::builder_state(format!(
                "pagination is 1-indexed with a positive page size, got page {page} of {per_page}"
            )));
        }
        self.tree.set_pagination(Pagination::page(page, per_page));
        Ok(self)
    }

    /// The tree built so far
    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    /// Finalizes the query
    pub fn build(self) -> Result<QueryTree> {
        if let Some(error) = self.deferred {
            return Err(error);
        }
        AttributeResolver::descriptor::<E>()?;
        Ok(self.tree)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut QueryTree {
        &mut self.tree
    }

    /// Keeps the first failure of an infallible-looking chained call for `build`
    pub(crate) fn defer(&mut self, result: Result<()>) {
        if let Err(error) = result {
            self.deferred.get_or_insert(error);
        }
    }

    fn condition<V, F>(&mut self, connective: Connective, selector: F) -> Result<Condition<'_, E, V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        Ok(Condition::new(self, connective, attribute))
    }

    fn group<G>(&mut self, connective: Connective, group: G) -> Result<&mut Self>
    where
        G: FnOnce(&mut Self) -> Result<()>,
    {
        let mut inner = Self::nested(self.tree.depth());
        group(&mut inner)?;
        if let Some(error) = inner.deferred.take() {
            return Err(error);
        }

        let grouped = &inner.tree;
        if !grouped.projections().is_empty()
            || !grouped.ordering().is_empty()
            || !grouped.grouping().is_empty()
            || !grouped.pagination().is_empty()
        {
            return Err(FluentQueryError::builder_state(
                "a predicate group may only add predicates",
            ));
        }

        let predicate = inner.tree.take_predicate().ok_or_else(|| {
            FluentQueryError::builder_state("a predicate group must add at least one predicate")
        })?;
        self.tree.add_predicate(connective, predicate)?;
        Ok(self)
    }
}
