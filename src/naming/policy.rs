//! Naming policies and explicit overrides.

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Case transformation applied to a logical name before templating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingCase {
    #[default]
    Snake,
    UpperSnake,
    Camel,
    Pascal,
    Preserve,
}

impl NamingCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            NamingCase::Snake => name.to_case(Case::Snake),
            NamingCase::UpperSnake => name.to_case(Case::UpperSnake),
            NamingCase::Camel => name.to_case(Case::Camel),
            NamingCase::Pascal => name.to_case(Case::Pascal),
            NamingCase::Preserve => name.to_string(),
        }
    }
}

/// Derives physical names for entities without explicit names
pub trait NamingPolicy: Send + Sync + Debug {
    fn table_name(&self, entity: &str) -> String;

    fn column_name(&self, entity: &str, attribute: &str) -> String;
}

/// Template-based policy: `{name}` in a template is replaced by the cased
/// logical name, e.g. `TB_{name}` with [`NamingCase::UpperSnake`] maps
/// `Customer` to `TB_CUSTOMER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateNaming {
    pub table_template: String,
    pub column_template: String,
    pub case: NamingCase,
}

impl TemplateNaming {
    pub const NAME_TOKEN: &'static str = "{name}";

    pub fn new(
        table_template: impl Into<String>,
        column_template: impl Into<String>,
        case: NamingCase,
    ) -> Self {
        Self {
            table_template: table_template.into(),
            column_template: column_template.into(),
            case,
        }
    }
}

impl Default for TemplateNaming {
    fn default() -> Self {
        Self::new(Self::NAME_TOKEN, Self::NAME_TOKEN, NamingCase::default())
    }
}

impl NamingPolicy for TemplateNaming {
    fn table_name(&self, entity: &str) -> String {
        self.table_template
            .replace(Self::NAME_TOKEN, &self.case.apply(entity))
    }

    fn column_name(&self, _entity: &str, attribute: &str) -> String {
        self.column_template
            .replace(Self::NAME_TOKEN, &self.case.apply(attribute))
    }
}

/// Setup-time override table, keyed by entity name and attribute name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOverrides {
    #[serde(default)]
    pub tables: HashMap<String, String>,
    #[serde(default)]
    pub columns: HashMap<String, HashMap<String, String>>,
}

impl NamingOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, entity: impl Into<String>, table: impl Into<String>) -> Self {
        self.tables.insert(entity.into(), table.into());
        self
    }

    pub fn with_column(
        mut self,
        entity: impl Into<String>,
        attribute: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.columns
            .entry(entity.into())
            .or_default()
            .insert(attribute.into(), column.into());
        self
    }

    pub fn table_for(&self, entity: &str) -> Option<&str> {
        lookup(&self.tables, entity).map(String::as_str)
    }

    pub fn column_for(&self, entity: &str, attribute: &str) -> Option<&str> {
        lookup(&self.columns, entity)
            .and_then(|columns| lookup(columns, attribute))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }
}

// Keys read through the config crate arrive lowercased.
fn lookup<'m, T>(map: &'m HashMap<String, T>, key: &str) -> Option<&'m T> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}
