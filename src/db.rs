use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use thiserror::Error;

use crate::config::DbConfig;

const SCHEMA: &str = include_str!("../schema.sql");

pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(cfg.pool_size.min(cfg.max_connections()))
        .max_connections(cfg.max_connections())
        .acquire_timeout(Duration::from_secs(10))
        .connect(&cfg.url)
        .await
        .context("connect to database")
}

/// Creates the `users`, `currencies` and `expenses` tables if they are absent.
pub async fn ensure_schema(db: &PgPool) -> anyhow::Result<()> {
    db.execute(SCHEMA).await.context("create tables")?;
    Ok(())
}

/// Storage failures, classified so callers can map constraint violations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation
            }
            _ => StoreError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
