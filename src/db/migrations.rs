//! Database migrations

use anyhow::{Context, Result};
use tracing::info;

use super::DbEngine;

/// One schema step; each statement runs on its own
struct Migration {
    version: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create songs table",
        statements: &[r#"
            CREATE TABLE IF NOT EXISTS songs (
                song_id SERIAL PRIMARY KEY,
                group_name TEXT NOT NULL,
                song TEXT NOT NULL,
                release_date TEXT NOT NULL DEFAULT '',
                lyrics TEXT,
                link TEXT NOT NULL DEFAULT ''
            )
            "#],
    },
    Migration {
        version: 2,
        description: "index songs by title",
        statements: &["CREATE INDEX IF NOT EXISTS idx_songs_song ON songs (song)"],
    },
];

/// Current migration version
pub fn current_version() -> i32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Run database migrations
pub async fn run_migrations(engine: &DbEngine) -> Result<()> {
    let pool = engine.pool();

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dbmigration (
            id INTEGER PRIMARY KEY,
            version INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migration table")?;

    sqlx::query("INSERT INTO dbmigration (id, version) VALUES (1, 0) ON CONFLICT (id) DO NOTHING")
        .execute(pool)
        .await?;

    let applied = get_migration_version(engine).await?;
    let target = current_version();

    if applied >= target {
        info!("Database is up to date (version {})", applied);
        return Ok(());
    }

    info!("Running migrations from version {} to {}", applied, target);

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        for statement in migration.statements {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| {
                    format!(
                        "Failed to apply migration {} ({})",
                        migration.version, migration.description
                    )
                })?;
        }

        sqlx::query("UPDATE dbmigration SET version = $1 WHERE id = 1")
            .bind(migration.version)
            .execute(pool)
            .await?;

        info!(
            "Applied migration {} ({})",
            migration.version, migration.description
        );
    }

    Ok(())
}

/// Get the applied migration version
pub async fn get_migration_version(engine: &DbEngine) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT version FROM dbmigration WHERE id = 1")
        .fetch_one(engine.pool())
        .await?;

    Ok(row.0)
}
