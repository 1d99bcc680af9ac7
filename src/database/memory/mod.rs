//! In-memory persistence engine.
//!
//! Interprets the statements this crate emits against schema-less tables held in
//! process memory. Tables are created by their first insert; selecting from a
//! table that was never written returns no rows. Comparisons follow SQL null
//! semantics: a predicate that is unknown for a row filters the row out.

mod parser;

use super::engine::{PersistenceEngine, Row};
use crate::error::EngineError;
use crate::metamodel::Value;
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlparser::ast::{
    BinaryOperator, Expr, GroupByExpr, Insert, LimitClause, OrderByKind, Query, Select,
    SelectItem, SetExpr, Statement, TableFactor, UnaryOperator, Value as SqlValue,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Failures of the in-memory engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryEngineError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("No parameter bound at index {index}")]
    MissingParameter { index: usize },

    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("Unsupported statement: {message}")]
    Unsupported { message: String },
}

impl MemoryEngineError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    fn cell(&self, row: &Row, column: &str) -> Result<Value, MemoryEngineError> {
        match row.get(column) {
            Some(value) => Ok(value.clone()),
            None if self.has_column(column) => Ok(Value::Null),
            None => Err(MemoryEngineError::UnknownColumn {
                column: format!("{}.{column}", self.name),
            }),
        }
    }
}

/// Tables behind a read-write lock; cheap to share through `Arc`
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table and its columns ahead of any insert
    pub fn create_table(&self, name: &str, columns: &[&str]) {
        let mut tables = self.tables.write();
        let table = tables
            .entry(table_key(name))
            .or_insert_with(|| Table::new(name));
        for column in columns {
            if !table.has_column(column) {
                table.columns.push((*column).to_string());
            }
        }
    }

    /// Snapshot of a table's rows in insertion order
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .get(&table_key(table))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().values().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.tables.write().clear();
    }

    /// Runs a select statement
    pub fn query(&self, statement: &str, parameters: &[Value]) -> Result<Vec<Row>, MemoryEngineError> {
        match parser::parse(statement)? {
            Statement::Query(query) => {
                let tables = self.tables.read();
                let evaluator = Evaluator {
                    tables: &tables,
                    parameters,
                };
                let rows = evaluator.query(&query, &mut Vec::new())?;
                debug!(statement = statement, rows = rows.len(), "In-memory select");
                Ok(rows)
            }
            other => Err(MemoryEngineError::unsupported(format!(
                "expected a select, found `{other}`"
            ))),
        }
    }

    /// Runs an insert statement, returning the affected row count
    pub fn update(&self, statement: &str, parameters: &[Value]) -> Result<u64, MemoryEngineError> {
        match parser::parse(statement)? {
            Statement::Insert(insert) => {
                let inserted = self.insert(&insert, parameters)?;
                debug!(statement = statement, rows = inserted, "In-memory insert");
                Ok(inserted)
            }
            other => Err(MemoryEngineError::unsupported(format!(
                "expected an insert, found `{other}`"
            ))),
        }
    }

    fn insert(&self, insert: &Insert, parameters: &[Value]) -> Result<u64, MemoryEngineError> {
        let name = insert.table.to_string();
        let columns: Vec<String> = insert.columns.iter().map(ToString::to_string).collect();
        let Some(SetExpr::Values(values)) = insert.source.as_ref().map(|q| q.body.as_ref()) else {
            return Err(MemoryEngineError::unsupported("insert without a values list"));
        };

        let mut rows = Vec::with_capacity(values.rows.len());
        for exprs in &values.rows {
            if exprs.len() != columns.len() {
                return Err(MemoryEngineError::unsupported(format!(
                    "{} values for {} columns",
                    exprs.len(),
                    columns.len()
                )));
            }
            let row = exprs
                .iter()
                .zip(&columns)
                .map(|(expr, column)| literal(expr, parameters).map(|value| (column.clone(), value)))
                .collect::<Result<Row, _>>()?;
            rows.push(row);
        }

        let mut tables = self.tables.write();
        let table = tables
            .entry(table_key(&name))
            .or_insert_with(|| Table::new(&name));
        for column in &columns {
            if !table.has_column(column) {
                table.columns.push(column.clone());
            }
        }
        let inserted = rows.len() as u64;
        table.rows.extend(rows);
        Ok(inserted)
    }
}

#[async_trait]
impl PersistenceEngine for MemoryEngine {
    async fn fetch(&self, statement: &str, parameters: &[Value]) -> Result<Vec<Row>, EngineError> {
        Ok(self.query(statement, parameters)?)
    }

    async fn execute(&self, statement: &str, parameters: &[Value]) -> Result<u64, EngineError> {
        Ok(self.update(statement, parameters)?)
    }
}

fn table_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Row of one query level, visible to correlated sub-queries
#[derive(Clone, Copy)]
struct Frame<'r> {
    alias: Option<&'r str>,
    table: &'r Table,
    row: &'r Row,
}

struct Evaluator<'t> {
    tables: &'t HashMap<String, Table>,
    parameters: &'t [Value],
}

impl<'t> Evaluator<'t> {
    fn query<'r>(&self, query: &'r Query, outer: &mut Vec<Frame<'r>>) -> Result<Vec<Row>, MemoryEngineError>
    where
        't: 'r,
    {
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Err(MemoryEngineError::unsupported(format!("query body `{}`", query.body)));
        };
        let (name, alias) = source(select)?;
        let Some(table) = self.tables.get(&table_key(&name)) else {
            return Ok(Vec::new());
        };
        let frame = |row: &'t Row| -> Frame<'r> { Frame { alias, table, row } };

        let mut matched: Vec<&Row> = Vec::new();
        for row in &table.rows {
            let keep = match &select.selection {
                None => true,
                Some(filter) => {
                    outer.push(frame(row));
                    let result = self.condition(filter, outer);
                    outer.pop();
                    result? == Some(true)
                }
            };
            if keep {
                matched.push(row);
            }
        }

        let group_by: Vec<&Expr> = match &select.group_by {
            GroupByExpr::Expressions(exprs, _) => exprs.iter().collect(),
            GroupByExpr::All(_) => return Err(MemoryEngineError::unsupported("group by all")),
        };
        if !group_by.is_empty() {
            let mut seen: Vec<Vec<Value>> = Vec::new();
            let mut grouped = Vec::new();
            for row in matched {
                let key = self.values_at(&group_by, frame(row), outer)?;
                if !seen.contains(&key) {
                    seen.push(key);
                    grouped.push(row);
                }
            }
            matched = grouped;
        }

        if let Some(order_by) = &query.order_by {
            let OrderByKind::Expressions(keys) = &order_by.kind else {
                return Err(MemoryEngineError::unsupported("order by all"));
            };
            let exprs: Vec<&Expr> = keys.iter().map(|key| &key.expr).collect();
            let mut keyed = matched
                .into_iter()
                .map(|row| self.values_at(&exprs, frame(row), outer).map(|key| (key, row)))
                .collect::<Result<Vec<_>, _>>()?;
            keyed.sort_by(|(left, _), (right, _)| {
                for (index, key) in keys.iter().enumerate() {
                    let ordering = sort_order(&left[index], &right[index]);
                    let ordering = if key.options.asc == Some(false) {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            matched = keyed.into_iter().map(|(_, row)| row).collect();
        }

        let (limit, offset) = match &query.limit_clause {
            None => (None, None),
            Some(LimitClause::LimitOffset { limit, offset, .. }) => {
                (limit.as_ref(), offset.as_ref().map(|o| &o.value))
            }
            Some(LimitClause::OffsetCommaLimit { offset, limit }) => (Some(limit), Some(offset)),
        };
        let offset = offset.map(|e| self.count(e)).transpose()?.unwrap_or(0);
        let limit = limit.map(|e| self.count(e)).transpose()?.unwrap_or(usize::MAX);

        matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| self.project(&select.projection, frame(row), outer))
            .collect()
    }

    fn project<'r>(
        &self,
        items: &[SelectItem],
        frame: Frame<'r>,
        outer: &mut Vec<Frame<'r>>,
    ) -> Result<Row, MemoryEngineError> {
        let mut projected = Row::new();
        outer.push(frame);
        for item in items {
            let result = match item {
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                    for column in &frame.table.columns {
                        projected.push(column.clone(), frame.row.get(column).cloned().unwrap_or(Value::Null));
                    }
                    Ok(())
                }
                SelectItem::UnnamedExpr(expr) => self
                    .value(expr, outer)
                    .map(|value| projected.push(column_label(expr), value)),
                SelectItem::ExprWithAlias { expr, alias } => self
                    .value(expr, outer)
                    .map(|value| projected.push(alias.value.clone(), value)),
            };
            if let Err(error) = result {
                outer.pop();
                return Err(error);
            }
        }
        outer.pop();
        Ok(projected)
    }

    /// Values of `exprs` with `frame` as the innermost scope
    fn values_at<'r>(
        &self,
        exprs: &[&Expr],
        frame: Frame<'r>,
        outer: &mut Vec<Frame<'r>>,
    ) -> Result<Vec<Value>, MemoryEngineError> {
        outer.push(frame);
        let values = exprs.iter().map(|expr| self.value(expr, outer)).collect();
        outer.pop();
        values
    }

    fn count(&self, expr: &Expr) -> Result<usize, MemoryEngineError> {
        match literal(expr, self.parameters)? {
            Value::Integer(count) => usize::try_from(count)
                .map_err(|_| MemoryEngineError::unsupported(format!("negative row count {count}"))),
            other => Err(MemoryEngineError::unsupported(format!("row count {other}"))),
        }
    }

    fn condition<'r>(
        &self,
        expr: &'r Expr,
        frames: &mut Vec<Frame<'r>>,
    ) -> Result<Option<bool>, MemoryEngineError>
    where
        't: 'r,
    {
        match expr {
            Expr::Nested(inner) => self.condition(inner, frames),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                let left = self.condition(left, frames)?;
                if left == Some(false) {
                    return Ok(Some(false));
                }
                Ok(match (left, self.condition(right, frames)?) {
                    (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                })
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Or,
                right,
            } => {
                let left = self.condition(left, frames)?;
                if left == Some(true) {
                    return Ok(Some(true));
                }
                Ok(match (left, self.condition(right, frames)?) {
                    (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                })
            }
            Expr::BinaryOp { left, op, right } => {
                let accept: fn(Ordering) -> bool = match op {
                    BinaryOperator::Eq => |o| o == Ordering::Equal,
                    BinaryOperator::NotEq => |o| o != Ordering::Equal,
                    BinaryOperator::Lt => |o| o == Ordering::Less,
                    BinaryOperator::LtEq => |o| o != Ordering::Greater,
                    BinaryOperator::Gt => |o| o == Ordering::Greater,
                    BinaryOperator::GtEq => |o| o != Ordering::Less,
                    other => return Err(MemoryEngineError::unsupported(format!("operator {other}"))),
                };
                let left = self.value(left, frames)?;
                let right = self.value(right, frames)?;
                Ok(left.compare(&right).map(accept))
            }
            Expr::Like {
                negated,
                expr,
                pattern,
                ..
            } => {
                let matched = match (self.value(expr, frames)?, self.value(pattern, frames)?) {
                    (Value::Null, _) | (_, Value::Null) => None,
                    (Value::Text(value), Value::Text(pattern)) => Some(like(&value, &pattern)),
                    (value, pattern) => Some(like(&value.to_string(), &pattern.to_string())),
                };
                Ok(matched.map(|m| m != *negated))
            }
            Expr::IsNull(inner) => Ok(Some(self.value(inner, frames)?.is_null())),
            Expr::IsNotNull(inner) => Ok(Some(!self.value(inner, frames)?.is_null())),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let value = self.value(expr, frames)?;
                let candidates = list
                    .iter()
                    .map(|candidate| self.value(candidate, frames))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(membership(&value, &candidates).map(|m| m != *negated))
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let value = self.value(expr, frames)?;
                let rows = self.query(subquery, frames)?;
                let candidates: Vec<Value> = rows
                    .iter()
                    .filter_map(|row| row.columns().next().map(|(_, value)| value.clone()))
                    .collect();
                Ok(membership(&value, &candidates).map(|m| m != *negated))
            }
            other => match self.value(other, frames)? {
                Value::Boolean(value) => Ok(Some(value)),
                Value::Null => Ok(None),
                value => Err(MemoryEngineError::unsupported(format!("non-boolean condition {value}"))),
            },
        }
    }

    fn value(&self, expr: &Expr, frames: &[Frame<'_>]) -> Result<Value, MemoryEngineError> {
        match expr {
            Expr::Identifier(column) => self.resolve(None, &column.value, frames),
            Expr::CompoundIdentifier(parts) => match parts.as_slice() {
                [column] => self.resolve(None, &column.value, frames),
                [qualifier, column] => self.resolve(Some(&qualifier.value), &column.value, frames),
                _ => Err(MemoryEngineError::unsupported(format!("column reference {expr}"))),
            },
            Expr::Nested(inner) => self.value(inner, frames),
            other => literal(other, self.parameters),
        }
    }

    /// Innermost frame whose alias (or table) matches, or that has the column
    fn resolve(
        &self,
        qualifier: Option<&str>,
        column: &str,
        frames: &[Frame<'_>],
    ) -> Result<Value, MemoryEngineError> {
        for frame in frames.iter().rev() {
            let matches = match qualifier {
                Some(qualifier) => {
                    frame.alias == Some(qualifier) || qualifier.eq_ignore_ascii_case(&frame.table.name)
                }
                None => frame.table.has_column(column),
            };
            if matches {
                return frame.table.cell(frame.row, column);
            }
        }
        Err(MemoryEngineError::UnknownColumn {
            column: match qualifier {
                Some(qualifier) => format!("{qualifier}.{column}"),
                None => column.to_string(),
            },
        })
    }
}

/// Table name and alias of a single-table select
fn source(select: &Select) -> Result<(String, Option<&str>), MemoryEngineError> {
    let [from] = select.from.as_slice() else {
        return Err(MemoryEngineError::unsupported("select must read exactly one table"));
    };
    if !from.joins.is_empty() {
        return Err(MemoryEngineError::unsupported("joins"));
    }
    match &from.relation {
        TableFactor::Table { name, alias, .. } => Ok((
            name.to_string(),
            alias.as_ref().map(|alias| alias.name.value.as_str()),
        )),
        other => Err(MemoryEngineError::unsupported(format!("table source `{other}`"))),
    }
}

/// Output column name of an unaliased projection item
fn column_label(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(column) => column.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map_or_else(|| expr.to_string(), |column| column.value.clone()),
        other => other.to_string(),
    }
}

/// Constant expression: a literal, a bound placeholder or a negated number
fn literal(expr: &Expr, parameters: &[Value]) -> Result<Value, MemoryEngineError> {
    match expr {
        Expr::Value(value) => match &value.value {
            SqlValue::Null => Ok(Value::Null),
            SqlValue::Boolean(value) => Ok(Value::Boolean(*value)),
            SqlValue::Number(text, _) => parser::number(text),
            SqlValue::SingleQuotedString(text) => Ok(Value::Text(text.clone())),
            SqlValue::Placeholder(name) => parser::parameter(name, parameters),
            other => Err(MemoryEngineError::unsupported(format!("literal {other}"))),
        },
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match literal(expr, parameters)? {
            Value::Integer(value) => Ok(Value::Integer(-value)),
            Value::Float(value) => Ok(Value::Float(-value)),
            Value::Decimal(value) => Ok(Value::Decimal(-value)),
            other => Err(MemoryEngineError::unsupported(format!("negated {other}"))),
        },
        Expr::Nested(inner) => literal(inner, parameters),
        other => Err(MemoryEngineError::unsupported(format!("expression {other}"))),
    }
}

fn membership(value: &Value, candidates: &[Value]) -> Option<bool> {
    if value.is_null() {
        return None;
    }
    let mut unknown = false;
    for candidate in candidates {
        match value.compare(candidate) {
            Some(Ordering::Equal) => return Some(true),
            None if candidate.is_null() => unknown = true,
            _ => {}
        }
    }
    if unknown {
        None
    } else {
        Some(false)
    }
}

/// Ascending order with nulls sorting after every value
fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
    }
}

/// SQL `like` with `%` (any run) and `_` (one character)
fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // matches[j] is whether value[..i] matches pattern[..j] for the current i
    let mut matches = vec![false; pattern.len() + 1];
    matches[0] = true;
    for j in 1..=pattern.len() {
        matches[j] = matches[j - 1] && pattern[j - 1] == '%';
    }

    for c in &value {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matches[j],
                '_' => matches[j - 1],
                p => matches[j - 1] && p == *c,
            };
        }
        matches = next;
    }

    matches[pattern.len()]
}
