//! Statement parsing on top of `sqlparser`.
//!
//! Positional `?` placeholders are renumbered to `$N` before the token stream
//! reaches the parser, so every placeholder in the tree names its parameter.

use super::MemoryEngineError;
use crate::metamodel::Value;
use rust_decimal::Decimal;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::str::FromStr;

pub(crate) fn parse(input: &str) -> Result<Statement, MemoryEngineError> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, input)
        .tokenize()
        .map_err(|e| MemoryEngineError::parse(e.to_string()))?;

    let mut statements = Parser::new(&dialect)
        .with_tokens(number_positional(tokens))
        .parse_statements()
        .map_err(|e| MemoryEngineError::parse(e.to_string()))?;

    match (statements.pop(), statements.is_empty()) {
        (Some(statement), true) => Ok(statement),
        (None, _) => Err(MemoryEngineError::parse("empty statement")),
        (Some(_), false) => Err(MemoryEngineError::parse("expected a single statement")),
    }
}

fn number_positional(tokens: Vec<Token>) -> Vec<Token> {
    let mut position = 0;
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Placeholder(name) if name == "?" => {
                position += 1;
                Token::Placeholder(format!("${position}"))
            }
            other => other,
        })
        .collect()
}

/// Parameter bound to a `$N` (one-based) or `:pN` (zero-based) placeholder
pub(crate) fn parameter(name: &str, parameters: &[Value]) -> Result<Value, MemoryEngineError> {
    let index = if let Some(number) = name.strip_prefix('$') {
        number.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
    } else if let Some(number) = name.strip_prefix(":p") {
        number.parse::<usize>().ok()
    } else {
        None
    };
    let index = index.ok_or_else(|| MemoryEngineError::unsupported(format!("placeholder {name}")))?;
    parameters
        .get(index)
        .cloned()
        .ok_or(MemoryEngineError::MissingParameter { index })
}

pub(crate) fn number(text: &str) -> Result<Value, MemoryEngineError> {
    let value = if text.contains(['.', 'e', 'E']) {
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .ok()
            .map(Value::Decimal)
    } else {
        text.parse().ok().map(Value::Integer)
    };
    value.ok_or_else(|| MemoryEngineError::parse(format!("invalid number {text}")))
}
