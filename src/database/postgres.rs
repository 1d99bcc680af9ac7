//! PostgreSQL engine over a SQLx connection pool.

use super::engine::{PersistenceEngine, Row};
use crate::config::DatabaseConfig;
use crate::error::{EngineError, FluentQueryError, Result};
use crate::metamodel::Value;
use crate::translation::PlaceholderStyle;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};
use tracing::info;
use uuid::Uuid;

/// Engine that runs statements with `$N` placeholders against a pool
#[derive(Debug, Clone)]
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url();

        info!(
            "Initializing database pool with {} max connections, {}s acquire timeout",
            config.max_connections, config.acquire_timeout_seconds
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&database_url)
            .await
            .map_err(|e| FluentQueryError::execution("connect", Vec::new(), e))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceEngine for PgEngine {
    fn placeholder_style(&self) -> Option<PlaceholderStyle> {
        Some(PlaceholderStyle::Numbered)
    }

    async fn fetch(&self, statement: &str, parameters: &[Value]) -> std::result::Result<Vec<Row>, EngineError> {
        let rows = bind_all(sqlx::query(statement), parameters)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, statement: &str, parameters: &[Value]) -> std::result::Result<u64, EngineError> {
        let result = bind_all(sqlx::query(statement), parameters)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    parameters: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for parameter in parameters {
        query = match parameter.clone() {
            // untyped nulls are sent as text and rely on server-side coercion
            Value::Null => query.bind(None::<String>),
            Value::Boolean(value) => query.bind(value),
            Value::Integer(value) => query.bind(value),
            Value::Float(value) => query.bind(value),
            Value::Decimal(value) => query.bind(value),
            Value::Text(value) => query.bind(value),
            Value::Timestamp(value) => query.bind(value),
            Value::Uuid(value) => query.bind(value),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> std::result::Result<Row, EngineError> {
    let mut decoded = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT8" => Value::from(row.try_get::<Option<i64>, _>(index)?),
            "INT4" => Value::from(row.try_get::<Option<i32>, _>(index)?.map(i64::from)),
            "INT2" => Value::from(row.try_get::<Option<i16>, _>(index)?.map(i64::from)),
            "FLOAT4" => Value::from(row.try_get::<Option<f32>, _>(index)?.map(f64::from)),
            "FLOAT8" => Value::from(row.try_get::<Option<f64>, _>(index)?),
            "NUMERIC" => Value::from(row.try_get::<Option<Decimal>, _>(index)?),
            "BOOL" => Value::from(row.try_get::<Option<bool>, _>(index)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::from(row.try_get::<Option<String>, _>(index)?),
            "TIMESTAMP" => Value::from(row.try_get::<Option<NaiveDateTime>, _>(index)?),
            "TIMESTAMPTZ" => Value::from(
                row.try_get::<Option<DateTime<Utc>>, _>(index)?
                    .map(|t| t.naive_utc()),
            ),
            "UUID" => Value::from(row.try_get::<Option<Uuid>, _>(index)?),
            other => {
                return Err(format!(
                    "column {} has unsupported type {other}",
                    column.name()
                )
                .into())
            }
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}
