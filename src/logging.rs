//! # Structured Logging Module
//!
//! Environment-aware structured logging for query translation, mapping discovery
//! and statement execution.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `RUST_LOG` wins over the environment default. Set
/// `FLUENT_QUERY_LOG_FORMAT=json` for one JSON object per event.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let json = std::env::var("FLUENT_QUERY_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Another subscriber may already be installed by the host application
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
pub(crate) fn get_environment() -> String {
    std::env::var("FLUENT_QUERY_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log a translated statement
pub fn log_translation(entity: &str, statement: &str, parameter_count: usize) {
    tracing::debug!(
        entity = %entity,
        statement = %statement,
        parameter_count = parameter_count,
        "🧮 TRANSLATION"
    );
}

/// Log a discovered entity mapping
pub fn log_discovery(entity: &str, table: &str, column_count: usize) {
    tracing::debug!(
        entity = %entity,
        table = %table,
        column_count = column_count,
        "🗺️ DISCOVERY"
    );
}

/// Log structured data for statement execution
pub fn log_execution(
    operation: &str,
    statement: &str,
    parameter_count: usize,
    status: &str,
    duration_ms: Option<u64>,
    rows: Option<u64>,
) {
    tracing::info!(
        operation = %operation,
        statement = %statement,
        parameter_count = parameter_count,
        status = %status,
        duration_ms = duration_ms,
        rows = rows,
        timestamp = %Utc::now().to_rfc3339(),
        "💾 EXECUTION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
