use crate::metamodel::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder token emitted for each bound parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    #[default]
    Positional,
    /// `:p0`, `:p1`, ...
    Named,
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
}

impl PlaceholderStyle {
    /// Token for the parameter at `index` (0-based)
    pub fn token(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Named => format!(":{}", parameter_name(index)),
            PlaceholderStyle::Numbered => format!("${}", index + 1),
        }
    }
}

/// Sequential parameter name, `p0`, `p1`, ...
pub fn parameter_name(index: usize) -> String {
    format!("p{index}")
}

/// Statement text with its bound parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslatedStatement {
    pub text: String,
    pub style: PlaceholderStyle,
    /// Parameter values in placeholder order
    pub positional: Vec<Value>,
    /// The same values keyed by sequential name
    pub named: BTreeMap<String, Value>,
}

impl TranslatedStatement {
    pub(crate) fn new(text: String, style: PlaceholderStyle, positional: Vec<Value>) -> Self {
        let named = positional
            .iter()
            .enumerate()
            .map(|(index, value)| (parameter_name(index), value.clone()))
            .collect();
        Self {
            text,
            style,
            positional,
            named,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn parameter_count(&self) -> usize {
        self.positional.len()
    }
}
