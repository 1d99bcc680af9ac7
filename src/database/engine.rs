use crate::error::EngineError;
use crate::metamodel::Value;
use crate::translation::PlaceholderStyle;
use async_trait::async_trait;

/// Raw result row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Sets `column`, replacing an existing value of the same name
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self
            .columns
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&column))
        {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Case-insensitive column lookup
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

/// Persistence engine collaborator
///
/// Receives statement text with its positional parameter values. Engine errors
/// are surfaced unchanged; the caller wraps them with the statement.
#[async_trait]
pub trait PersistenceEngine: Send + Sync {
    /// Placeholder style the engine requires, `None` when it accepts any
    fn placeholder_style(&self) -> Option<PlaceholderStyle> {
        None
    }

    async fn fetch(&self, statement: &str, parameters: &[Value]) -> Result<Vec<Row>, EngineError>;

    /// Runs a write, returning the affected row count
    async fn execute(&self, statement: &str, parameters: &[Value]) -> Result<u64, EngineError>;
}
