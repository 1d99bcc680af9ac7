//! Query expression tree.
//!
//! Plain data plus the structural checks run when a node is attached. A tree is
//! only mutated by its builder; once built it is read-only and can be translated
//! from any number of threads.

use super::pagination::Pagination;
use crate::error::{FluentQueryError, Result};
use crate::metamodel::{AttributeRef, EntityKey, Value};
use std::fmt;

/// Comparison operator of a predicate leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Like,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Like => "like",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::In => "in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
        }
    }

    fn accepts(self, operand: &Operand) -> bool {
        match self {
            Operator::IsNull | Operator::IsNotNull => matches!(operand, Operand::None),
            Operator::In => matches!(operand, Operand::Values(_) | Operand::SubQuery(_)),
            Operator::Like => matches!(operand, Operand::Value(_)),
            _ => matches!(operand, Operand::Value(_) | Operand::Correlated(_)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Attribute of an enclosing query, at the absolute nesting depth it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatedRef {
    pub attribute: AttributeRef,
    pub depth: usize,
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Value(Value),
    Values(Vec<Value>),
    Correlated(CorrelatedRef),
    SubQuery(Box<QueryTree>),
}

/// Predicate leaf: `<attribute> <operator> <operand>`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub attribute: AttributeRef,
    pub operator: Operator,
    pub operand: Operand,
}

/// Boolean connective used when grafting a predicate onto an existing tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn token(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison(Comparison),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Grafts `next` onto `self` with left-to-right association: same-connective
    /// roots are extended, otherwise the current root becomes the first child.
    pub fn combine(self, connective: Connective, next: Predicate) -> Predicate {
        match (connective, self) {
            (Connective::And, Predicate::And(mut children)) => {
                children.push(next);
                Predicate::And(children)
            }
            (Connective::Or, Predicate::Or(mut children)) => {
                children.push(next);
                Predicate::Or(children)
            }
            (Connective::And, current) => Predicate::And(vec![current, next]),
            (Connective::Or, current) => Predicate::Or(vec![current, next]),
        }
    }

    /// Leaves in pre-order
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut leaves = Vec::new();
        self.collect(&mut leaves);
        leaves
    }

    fn collect<'a>(&'a self, leaves: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::Comparison(comparison) => leaves.push(comparison),
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().for_each(|child| child.collect(leaves))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn token(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderClause {
    pub attribute: AttributeRef,
    pub direction: Direction,
}

/// One select query over a target entity
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTree {
    entity: EntityKey,
    depth: usize,
    projections: Vec<AttributeRef>,
    predicate: Option<Predicate>,
    grouping: Vec<AttributeRef>,
    ordering: Vec<OrderClause>,
    pagination: Pagination,
}

impl QueryTree {
    pub(crate) fn new(entity: EntityKey, depth: usize) -> Self {
        Self {
            entity,
            depth,
            projections: Vec::new(),
            predicate: None,
            grouping: Vec::new(),
            ordering: Vec::new(),
            pagination: Pagination::default(),
        }
    }

    pub fn entity(&self) -> EntityKey {
        self.entity
    }

    /// Nesting depth, 0 for an outermost query
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Projected attributes; empty means all mapped attributes
    pub fn projections(&self) -> &[AttributeRef] {
        &self.projections
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn grouping(&self) -> &[AttributeRef] {
        &self.grouping
    }

    pub fn ordering(&self) -> &[OrderClause] {
        &self.ordering
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub(crate) fn add_projection(&mut self, attribute: AttributeRef) -> Result<()> {
        self.check_owned(&attribute)?;
        self.projections.push(attribute);
        Ok(())
    }

    pub(crate) fn add_grouping(&mut self, attribute: AttributeRef) -> Result<()> {
        self.check_owned(&attribute)?;
        self.grouping.push(attribute);
        Ok(())
    }

    pub(crate) fn add_ordering(&mut self, clause: OrderClause) -> Result<()> {
        self.check_owned(&clause.attribute)?;
        self.ordering.push(clause);
        Ok(())
    }

    pub(crate) fn set_limit(&mut self, limit: u64) {
        self.pagination = self.pagination.with_limit(limit);
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.pagination = self.pagination.with_offset(offset);
    }

    pub(crate) fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    /// Validates every leaf of `predicate`, then grafts it onto the root
    pub(crate) fn add_predicate(&mut self, connective: Connective, predicate: Predicate) -> Result<()> {
        for comparison in predicate.comparisons() {
            self.check_comparison(comparison)?;
        }

        self.predicate = Some(match self.predicate.take() {
            None => predicate,
            Some(current) => current.combine(connective, predicate),
        });
        Ok(())
    }

    pub(crate) fn take_predicate(&mut self) -> Option<Predicate> {
        self.predicate.take()
    }

    fn check_owned(&self, attribute: &AttributeRef) -> Result<()> {
        if attribute.entity != self.entity {
            return Err(FluentQueryError::invalid_attribute(
                self.entity.name,
                attribute.to_string(),
                format!("attribute belongs to {}", attribute.entity.name),
            ));
        }
        Ok(())
    }

    fn check_comparison(&self, comparison: &Comparison) -> Result<()> {
        self.check_owned(&comparison.attribute)?;
        let invalid = |message: String| {
            FluentQueryError::invalid_attribute(self.entity.name, comparison.attribute.name, message)
        };

        if !comparison.operator.accepts(&comparison.operand) {
            return Err(invalid(format!(
                "operator '{}' does not accept this operand",
                comparison.operator
            )));
        }

        match &comparison.operand {
            Operand::Values(values) if values.is_empty() => {
                Err(invalid("membership list must not be empty".to_string()))
            }
            Operand::Correlated(reference) if reference.depth >= self.depth => Err(invalid(format!(
                "correlated reference to {} at depth {} is not enclosing depth {}",
                reference.attribute, reference.depth, self.depth
            ))),
            Operand::SubQuery(sub) if sub.depth != self.depth + 1 => Err(invalid(format!(
                "sub-query at depth {} nested under depth {}",
                sub.depth, self.depth
            ))),
            Operand::SubQuery(sub) if sub.projections.len() != 1 => Err(invalid(format!(
                "membership sub-query over {} must project exactly one attribute, found {}",
                sub.entity.name,
                sub.projections.len()
            ))),
            Operand::SubQuery(sub) => match sub
                .correlated_references()
                .into_iter()
                .find(|r| r.depth == self.depth && r.attribute.entity != self.entity)
            {
                Some(reference) => Err(invalid(format!(
                    "correlated reference to {} does not name {} at depth {}",
                    reference.attribute, self.entity.name, self.depth
                ))),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Correlated references below this query, nested sub-queries included
    pub fn correlated_references(&self) -> Vec<CorrelatedRef> {
        let mut references = Vec::new();
        for comparison in self.predicate.iter().flat_map(Predicate::comparisons) {
            match &comparison.operand {
                Operand::Correlated(reference) => references.push(*reference),
                Operand::SubQuery(sub) => references.extend(sub.correlated_references()),
                _ => {}
            }
        }
        references
    }
}
