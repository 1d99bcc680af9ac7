//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers, lowest precedence first:
//!
//! 1. the preset for the detected environment
//! 2. `fluent-query.{yaml,yml,toml,json}` in the configuration directory
//! 3. `fluent-query.<environment>.{yaml,yml,toml,json}` in the same directory
//! 4. `FLUENT_QUERY__*` environment variables, `__` separating nested keys
//!    (`FLUENT_QUERY__DATABASE__MAX_CONNECTIONS=4`)

use super::FluentQueryConfig;
use crate::error::Result;
use crate::logging::get_environment;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const FILE_STEM: &str = "fluent-query";
const EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Loaded, validated configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: FluentQueryConfig,
    environment: String,
    sources: Vec<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection from `./config`
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load from a directory with an explicit environment, without touching
    /// process-wide environment detection
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        let directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));
        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            directory.display()
        );

        let sources: Vec<PathBuf> = [
            Self::find_config_file(&directory, FILE_STEM),
            Self::find_config_file(&directory, &format!("{FILE_STEM}.{environment}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_sources(sources, environment)
    }

    /// Load a single explicit file over the environment preset
    pub fn load_from_file(path: &Path) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_sources(vec![path.to_path_buf()], &environment)
    }

    /// Wrap an already built configuration
    pub fn from_config(config: FluentQueryConfig) -> Result<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            sources: Vec::new(),
        }))
    }

    pub fn config(&self) -> &FluentQueryConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Files that contributed to the configuration, in layering order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    fn load_sources(sources: Vec<PathBuf>, environment: &str) -> Result<Arc<ConfigManager>> {
        let preset = FluentQueryConfig::for_environment(environment);
        let mut builder = Config::builder().add_source(Config::try_from(&preset)?);
        for source in &sources {
            debug!("Found configuration file: {}", source.display());
            builder = builder.add_source(File::from(source.as_path()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("FLUENT_QUERY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: FluentQueryConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            environment = environment,
            files = sources.len(),
            case = ?config.naming.case,
            query_placeholders = ?config.translation.query_placeholders,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            sources,
        }))
    }

    fn find_config_file(directory: &Path, stem: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{stem}.{extension}")))
            .find(|path| path.is_file())
    }

    /// Detect current environment, lowercased
    fn detect_environment() -> String {
        get_environment().to_lowercase()
    }
}
