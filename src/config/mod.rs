//! # Fluent Query Configuration
//!
//! Naming, translation and database settings with environment-aware defaults.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fluent_query::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, then config/fluent-query.{yaml,toml,json}, then FLUENT_QUERY__* variables
//! let manager = ConfigManager::load()?;
//!
//! let case = manager.config().naming.case;
//! let pool_size = manager.config().database.max_connections;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::error::{FluentQueryError, Result};
use crate::naming::{NamingCase, NamingOverrides, TemplateNaming};
use crate::translation::PlaceholderStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluentQueryConfig {
    pub naming: NamingConfig,
    pub translation: TranslationConfig,
    pub database: DatabaseConfig,
}

/// Default naming policy and the setup-time override table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub table_template: String,
    pub column_template: String,
    pub case: NamingCase,
    pub overrides: NamingOverrides,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            table_template: TemplateNaming::NAME_TOKEN.to_string(),
            column_template: TemplateNaming::NAME_TOKEN.to_string(),
            case: NamingCase::default(),
            overrides: NamingOverrides::default(),
        }
    }
}

/// Placeholder styles used by the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub query_placeholders: PlaceholderStyle,
    pub insert_placeholders: PlaceholderStyle,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            query_placeholders: PlaceholderStyle::Positional,
            insert_placeholders: PlaceholderStyle::Named,
        }
    }
}

impl TranslationConfig {
    /// `$N` placeholders everywhere, as PostgreSQL expects
    pub fn for_postgres() -> Self {
        Self {
            query_placeholders: PlaceholderStyle::Numbered,
            insert_placeholders: PlaceholderStyle::Numbered,
        }
    }
}

/// Connection settings for the PostgreSQL engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/fluent_query_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` when set, the configured URL otherwise
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

impl FluentQueryConfig {
    /// Small pool and short timeouts for test suites
    pub fn for_test() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/fluent_query_test".to_string(),
                max_connections: 2,
                acquire_timeout_seconds: 5,
            },
            ..Self::default()
        }
    }

    pub fn for_development() -> Self {
        Self {
            database: DatabaseConfig {
                max_connections: 5,
                acquire_timeout_seconds: 10,
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }

    /// Preset for an environment name, production defaults otherwise
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "test" => {
                info!("Loading test fluent query configuration");
                Self::for_test()
            }
            "development" => {
                info!("Loading development fluent query configuration");
                Self::for_development()
            }
            _ => {
                info!("Loading production fluent query configuration");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, template) in [
            ("naming.table_template", &self.naming.table_template),
            ("naming.column_template", &self.naming.column_template),
        ] {
            if !template.contains(TemplateNaming::NAME_TOKEN) {
                return Err(FluentQueryError::configuration(format!(
                    "{field} '{template}' must contain {}",
                    TemplateNaming::NAME_TOKEN
                )));
            }
        }

        if self.database.url.trim().is_empty() {
            return Err(FluentQueryError::configuration("database.url must not be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(FluentQueryError::configuration(
                "database.max_connections must be greater than 0",
            ));
        }

        Ok(())
    }
}
