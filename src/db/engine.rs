//! Database engine and connection management

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;

/// Database engine wrapper
#[derive(Clone)]
pub struct DbEngine {
    pool: PgPool,
}

impl DbEngine {
    /// Open a connection pool and check that the server answers
    pub async fn connect(config: &DatabaseConfig, acquire_timeout: Duration) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to database {} at {}:{}",
                    config.name, config.host, config.port
                )
            })?;

        let engine = Self { pool };
        engine.ping().await?;

        info!(
            "Connected to database {} at {}:{}",
            config.name, config.host, config.port
        );
        Ok(engine)
    }

    /// Wrap an existing pool
    #[cfg(test)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Failed to ping database")?;
        Ok(())
    }
}
