//! # Statement Translation
//!
//! Deterministic rendering of query and insert trees into SQL text plus bound
//! parameters.
//!
//! Tables receive sequential aliases (`e0`, `e1`, ...) in pre-order: the outer
//! query first, then each sub-query as the predicate walk reaches it. Parameters
//! are collected in the order their placeholders are written, so values of a
//! sub-query sit between the outer values to its left and to its right. The root
//! predicate group is written bare; nested groups with more than one child are
//! parenthesized.

mod statement;

pub use statement::{parameter_name, PlaceholderStyle, TranslatedStatement};

use crate::config::TranslationConfig;
use crate::error::{FluentQueryError, Result};
use crate::logging::log_translation;
use crate::metamodel::{AttributeRef, Value};
use crate::naming::{EntityMapping, NamingConvention};
use crate::query_builder::{
    Comparison, CorrelatedRef, InsertTree, Operand, Predicate, QueryTree,
};
use std::sync::Arc;

/// Translates trees against one naming convention
#[derive(Debug, Clone, Copy)]
pub struct SqlTranslator<'c> {
    convention: &'c NamingConvention,
    query_placeholders: PlaceholderStyle,
    insert_placeholders: PlaceholderStyle,
}

impl<'c> SqlTranslator<'c> {
    /// Positional placeholders for queries, named ones for inserts
    pub fn new(convention: &'c NamingConvention) -> Self {
        Self {
            convention,
            query_placeholders: PlaceholderStyle::Positional,
            insert_placeholders: PlaceholderStyle::Named,
        }
    }

    pub fn from_config(convention: &'c NamingConvention, config: &TranslationConfig) -> Self {
        Self::new(convention)
            .with_query_placeholders(config.query_placeholders)
            .with_insert_placeholders(config.insert_placeholders)
    }

    pub fn with_query_placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.query_placeholders = style;
        self
    }

    pub fn with_insert_placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.insert_placeholders = style;
        self
    }

    pub fn translate(&self, tree: &QueryTree) -> Result<TranslatedStatement> {
        let mut emitter = Emitter::new(self.convention, self.query_placeholders);
        emitter.query(tree)?;
        let statement = emitter.finish();
        log_translation(tree.entity().name, &statement.text, statement.parameter_count());
        Ok(statement)
    }

    pub fn translate_insert(&self, tree: &InsertTree) -> Result<TranslatedStatement> {
        let mapping = self.convention.mapping(&tree.entity())?;
        let mut emitter = Emitter::new(self.convention, self.insert_placeholders);

        let mut columns = Vec::with_capacity(tree.bindings().len());
        let mut placeholders = Vec::with_capacity(tree.bindings().len());
        for (attribute, value) in tree.bindings() {
            columns.push(column_of(&mapping, attribute)?);
            placeholders.push(emitter.bind(value.clone()));
        }

        emitter.text = format!(
            "insert into {} ({}) values ({})",
            mapping.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        let statement = emitter.finish();
        log_translation(tree.entity().name, &statement.text, statement.parameter_count());
        Ok(statement)
    }
}

struct Scope {
    depth: usize,
    alias: String,
    mapping: Arc<EntityMapping>,
}

struct Emitter<'c> {
    convention: &'c NamingConvention,
    style: PlaceholderStyle,
    text: String,
    parameters: Vec<Value>,
    next_alias: usize,
    scopes: Vec<Scope>,
}

impl<'c> Emitter<'c> {
    fn new(convention: &'c NamingConvention, style: PlaceholderStyle) -> Self {
        Self {
            convention,
            style,
            text: String::new(),
            parameters: Vec::new(),
            next_alias: 0,
            scopes: Vec::new(),
        }
    }

    fn finish(self) -> TranslatedStatement {
        TranslatedStatement::new(self.text, self.style, self.parameters)
    }

    fn bind(&mut self, value: Value) -> String {
        let token = self.style.token(self.parameters.len());
        self.parameters.push(value);
        token
    }

    fn query(&mut self, tree: &QueryTree) -> Result<()> {
        let mapping = self.convention.mapping(&tree.entity())?;
        let alias = format!("e{}", self.next_alias);
        self.next_alias += 1;
        self.scopes.push(Scope {
            depth: tree.depth(),
            alias: alias.clone(),
            mapping: Arc::clone(&mapping),
        });

        self.text.push_str("select ");
        if tree.projections().is_empty() {
            self.text.push_str(&format!("{alias}.*"));
        } else {
            let columns = self.qualified_list(tree.projections())?;
            self.text.push_str(&columns);
        }
        self.text.push_str(&format!(" from {} {alias}", mapping.table));

        if let Some(predicate) = tree.predicate() {
            self.text.push_str(" where ");
            self.predicate(predicate, false)?;
        }

        if !tree.grouping().is_empty() {
            let columns = self.qualified_list(tree.grouping())?;
            self.text.push_str(&format!(" group by {columns}"));
        }

        if !tree.ordering().is_empty() {
            let keys = tree
                .ordering()
                .iter()
                .map(|clause| {
                    self.qualified(&clause.attribute)
                        .map(|column| format!("{column} {}", clause.direction.token()))
                })
                .collect::<Result<Vec<_>>>()?;
            self.text.push_str(&format!(" order by {}", keys.join(", ")));
        }

        self.text.push_str(&tree.pagination().to_sql());
        self.scopes.pop();
        Ok(())
    }

    fn predicate(&mut self, predicate: &Predicate, nested: bool) -> Result<()> {
        let (children, connective) = match predicate {
            Predicate::Comparison(comparison) => return self.comparison(comparison),
            Predicate::And(children) => (children, " and "),
            Predicate::Or(children) => (children, " or "),
        };

        let parenthesize = nested && children.len() > 1;
        if parenthesize {
            self.text.push('(');
        }
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                self.text.push_str(connective);
            }
            self.predicate(child, true)?;
        }
        if parenthesize {
            self.text.push(')');
        }
        Ok(())
    }

    fn comparison(&mut self, comparison: &Comparison) -> Result<()> {
        let column = self.qualified(&comparison.attribute)?;
        let operator = comparison.operator.token();
        self.text.push_str(&format!("{column} {operator}"));

        match &comparison.operand {
            Operand::None => {}
            Operand::Value(value) => {
                let token = self.bind(value.clone());
                self.text.push_str(&format!(" {token}"));
            }
            Operand::Values(values) => {
                let tokens: Vec<String> = values.iter().map(|v| self.bind(v.clone())).collect();
                self.text.push_str(&format!(" ({})", tokens.join(", ")));
            }
            Operand::Correlated(reference) => {
                let outer = self.correlated(reference)?;
                self.text.push_str(&format!(" {outer}"));
            }
            Operand::SubQuery(sub) => {
                self.text.push_str(" (");
                self.query(sub)?;
                self.text.push(')');
            }
        }
        Ok(())
    }

    fn qualified_list(&self, attributes: &[AttributeRef]) -> Result<String> {
        let columns = attributes
            .iter()
            .map(|attribute| self.qualified(attribute))
            .collect::<Result<Vec<_>>>()?;
        Ok(columns.join(", "))
    }

    /// `<alias>.<column>` in the innermost scope
    fn qualified(&self, attribute: &AttributeRef) -> Result<String> {
        let scope = self.scopes.last().ok_or_else(|| {
            FluentQueryError::builder_state("attribute rendered outside of a query scope")
        })?;
        Ok(format!("{}.{}", scope.alias, column_of(&scope.mapping, attribute)?))
    }

    fn correlated(&self, reference: &CorrelatedRef) -> Result<String> {
        let scope = self
            .scopes
            .iter()
            .rev()
            .find(|scope| scope.depth == reference.depth)
            .ok_or_else(|| {
                FluentQueryError::invalid_attribute(
                    reference.attribute.entity.name,
                    reference.attribute.name,
                    format!("no enclosing query at depth {}", reference.depth),
                )
            })?;
        Ok(format!(
            "{}.{}",
            scope.alias,
            column_of(&scope.mapping, &reference.attribute)?
        ))
    }
}

fn column_of(mapping: &EntityMapping, attribute: &AttributeRef) -> Result<String> {
    if mapping.entity != attribute.entity {
        return Err(FluentQueryError::unknown_attribute(
            mapping.entity.name,
            attribute.to_string(),
        ));
    }
    mapping
        .column(attribute.name)
        .map(|c| c.column.clone())
        .ok_or_else(|| FluentQueryError::unknown_attribute(attribute.entity.name, attribute.name))
}
