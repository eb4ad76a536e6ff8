//! Database initialization
//!
//! Creates the database file on first run, then the document tables and
//! the default runtime settings. Every step is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

use super::settings::{ensure_setting, EMAIL_ENABLED_KEY, REMINDER_INTERVAL_KEY};
use crate::db::models::AppSettings;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets list reads proceed while a batch delete is writing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with schema and defaults.
///
/// The connection never expires, so the data lives as long as the pool.
pub async fn init_in_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_musicians_table(pool).await?;
    create_scores_table(pool).await?;
    create_loans_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

async fn create_musicians_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS musicians (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            instrument TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_scores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scores (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            composer TEXT NOT NULL,
            part TEXT NOT NULL,
            catalog_number TEXT,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Loans reference musicians and scores by id without foreign keys:
/// returned loans outlive the documents they point at.
async fn create_loans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS loans (
            id TEXT PRIMARY KEY,
            musician_id TEXT NOT NULL,
            score_id TEXT NOT NULL,
            loan_date TIMESTAMP NOT NULL,
            return_date TIMESTAMP,
            status TEXT NOT NULL CHECK (status IN ('active', 'returned')),
            notes TEXT,
            created_at TIMESTAMP NOT NULL,
            last_reminder_sent TIMESTAMP,
            CHECK ((status = 'active') = (return_date IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_loans_status ON loans(status)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Runtime settings and the API token, as key-value pairs
async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure the AppSettings singleton exists with its defaults
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    let defaults = AppSettings::default();
    ensure_setting(pool, EMAIL_ENABLED_KEY, &defaults.email_enabled.to_string()).await?;
    ensure_setting(
        pool,
        REMINDER_INTERVAL_KEY,
        &defaults.reminder_interval_days.to_string(),
    )
    .await?;
    Ok(())
}
