//! Comparison, membership and ordering steps of the fluent chain.

use super::builder::QueryBuilder;
use super::tree::{
    Comparison, Connective, CorrelatedRef, Direction, Operand, Operator, OrderClause, Predicate,
};
use crate::error::Result;
use crate::metamodel::{Attribute, AttributeRef, AttributeResolver, Entity, FieldValue, Value};
use std::marker::PhantomData;

/// Pending comparison on an attribute of type `V`, completed by an operator
pub struct Condition<'a, E: Entity, V> {
    builder: &'a mut QueryBuilder<E>,
    connective: Connective,
    attribute: AttributeRef,
    _marker: PhantomData<fn() -> V>,
}

macro_rules! value_comparisons {
    ($($(#[$doc:meta])* $name:ident => $operator:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(self, value: impl Into<V>) -> &'a mut QueryBuilder<E> {
                let value: V = value.into();
                self.attach(Operator::$operator, Operand::Value(value.into_value()))
            }
        )*
    };
}

macro_rules! outer_comparisons {
    ($($(#[$doc:meta])* $name:ident => $operator:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(self, outer: Correlated<V>) -> Result<&'a mut QueryBuilder<E>> {
                self.try_attach(Operator::$operator, Operand::Correlated(outer.reference))
            }
        )*
    };
}

impl<'a, E: Entity, V: FieldValue> Condition<'a, E, V> {
    pub(crate) fn new(
        builder: &'a mut QueryBuilder<E>,
        connective: Connective,
        attribute: AttributeRef,
    ) -> Self {
        Self {
            builder,
            connective,
            attribute,
            _marker: PhantomData,
        }
    }

    value_comparisons! {
        eq => Eq,
        ne => Ne,
        gt => Gt,
        ge => Ge,
        lt => Lt,
        le => Le,
    }

    outer_comparisons! {
        /// Equality with an attribute of an enclosing query's current row
        eq_outer => Eq,
        ne_outer => Ne,
        gt_outer => Gt,
        ge_outer => Ge,
        lt_outer => Lt,
        le_outer => Le,
    }

    pub fn is_null(self) -> &'a mut QueryBuilder<E> {
        self.attach(Operator::IsNull, Operand::None)
    }

    pub fn is_not_null(self) -> &'a mut QueryBuilder<E> {
        self.attach(Operator::IsNotNull, Operand::None)
    }

    /// Membership in a literal list; an empty list is rejected
    pub fn in_values<I, T>(self, values: I) -> Result<&'a mut QueryBuilder<E>>
    where
        I: IntoIterator<Item = T>,
        T: Into<V>,
    {
        let values: Vec<Value> = values
            .into_iter()
            .map(|value| Into::<V>::into(value).into_value())
            .collect();
        self.try_attach(Operator::In, Operand::Values(values))
    }

    /// Membership in a sub-query over `S`
    ///
    /// `build` receives the sub-query builder and a handle on the current row of
    /// this query for correlation. The sub-query must select exactly one attribute.
    pub fn in_query<S, F>(self, build: F) -> Result<&'a mut QueryBuilder<E>>
    where
        S: Entity,
        F: FnOnce(&mut QueryBuilder<S>, &Outer<E>) -> Result<()>,
    {
        let depth = self.builder.tree().depth();
        let mut sub = QueryBuilder::<S>::nested(depth + 1);
        build(&mut sub, &Outer::new(depth))?;
        let sub = sub.build()?;
        self.try_attach(Operator::In, Operand::SubQuery(Box::new(sub)))
    }

    fn comparison(&self, operator: Operator, operand: Operand) -> Predicate {
        Predicate::Comparison(Comparison {
            attribute: self.attribute,
            operator,
            operand,
        })
    }

    fn attach(self, operator: Operator, operand: Operand) -> &'a mut QueryBuilder<E> {
        let predicate = self.comparison(operator, operand);
        let result = self
            .builder
            .tree_mut()
            .add_predicate(self.connective, predicate);
        self.builder.defer(result);
        self.builder
    }

    fn try_attach(self, operator: Operator, operand: Operand) -> Result<&'a mut QueryBuilder<E>> {
        let predicate = self.comparison(operator, operand);
        self.builder
            .tree_mut()
            .add_predicate(self.connective, predicate)?;
        Ok(self.builder)
    }
}

impl<'a, E: Entity> Condition<'a, E, String> {
    /// Pattern match with `%` and `_` wildcards
    pub fn like(self, pattern: impl Into<String>) -> &'a mut QueryBuilder<E> {
        self.attach(Operator::Like, Operand::Value(Value::Text(pattern.into())))
    }
}

/// Handle on the current row of an enclosing query over `E`
#[derive(Debug)]
pub struct Outer<E> {
    depth: usize,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Outer<E> {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth,
            _marker: PhantomData,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reference to one attribute of the enclosing row
    pub fn get<V, F>(&self, selector: F) -> Result<Correlated<V>>
    where
        V: FieldValue,
        F: FnOnce(&E::Fields) -> Attribute<E, V>,
    {
        let attribute = AttributeResolver::resolve::<E, V, F>(selector)?;
        Ok(Correlated {
            reference: CorrelatedRef {
                attribute,
                depth: self.depth,
            },
            _marker: PhantomData,
        })
    }
}

/// Typed correlated reference, accepted by the `*_outer` comparisons
#[derive(Debug)]
pub struct Correlated<V> {
    reference: CorrelatedRef,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Clone for Correlated<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Correlated<V> {}

impl<V> Correlated<V> {
    pub fn reference(&self) -> CorrelatedRef {
        self.reference
    }
}

/// Pending ordering key, completed by a direction
pub struct OrderBy<'a, E: Entity> {
    builder: &'a mut QueryBuilder<E>,
    attribute: AttributeRef,
}

impl<'a, E: Entity> OrderBy<'a, E> {
    pub(crate) fn new(builder: &'a mut QueryBuilder<E>, attribute: AttributeRef) -> Self {
        Self { builder, attribute }
    }

    pub fn asc(self) -> &'a mut QueryBuilder<E> {
        self.direction(Direction::Asc)
    }

    pub fn desc(self) -> &'a mut QueryBuilder<E> {
        self.direction(Direction::Desc)
    }

    fn direction(self, direction: Direction) -> &'a mut QueryBuilder<E> {
        let result = self.builder.tree_mut().add_ordering(OrderClause {
            attribute: self.attribute,
            direction,
        });
        self.builder.defer(result);
        self.builder
    }
}
