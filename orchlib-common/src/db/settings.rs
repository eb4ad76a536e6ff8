//! Settings table access
//!
//! The AppSettings singleton is stored as two rows of the key-value
//! settings table. Saving overwrites both rows in one transaction.

use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::db::models::AppSettings;
use crate::{Error, Result};

pub const EMAIL_ENABLED_KEY: &str = "email_enabled";
pub const REMINDER_INTERVAL_KEY: &str = "reminder_interval_days";

/// Insert `key` with `default_value` if absent, or reset a NULL value
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let inserted = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?
        .rows_affected();

    if inserted > 0 {
        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let reset = sqlx::query("UPDATE settings SET value = ? WHERE key = ? AND value IS NULL")
        .bind(default_value)
        .bind(key)
        .execute(pool)
        .await?
        .rows_affected();

    if reset > 0 {
        info!("Reset NULL setting '{}' to default value: {}", key, default_value);
    }

    Ok(())
}

/// Generic setting getter
pub async fn get_setting<T: FromStr>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value.flatten() {
        Some(s) => s.parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!("Failed to parse setting '{}' value: {}", key, s))
        }),
        None => Ok(None),
    }
}

/// Generic setting setter (insert or overwrite)
pub async fn set_setting<T: ToString>(pool: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load AppSettings, creating the defaults if the singleton is absent
pub async fn load_app_settings(pool: &SqlitePool) -> Result<AppSettings> {
    let defaults = AppSettings::default();

    let email_enabled = match get_setting::<bool>(pool, EMAIL_ENABLED_KEY).await? {
        Some(enabled) => enabled,
        None => {
            ensure_setting(pool, EMAIL_ENABLED_KEY, &defaults.email_enabled.to_string()).await?;
            defaults.email_enabled
        }
    };

    let reminder_interval_days = match get_setting::<u32>(pool, REMINDER_INTERVAL_KEY).await? {
        Some(days) => days.max(1),
        None => {
            ensure_setting(
                pool,
                REMINDER_INTERVAL_KEY,
                &defaults.reminder_interval_days.to_string(),
            )
            .await?;
            defaults.reminder_interval_days
        }
    };

    Ok(AppSettings {
        email_enabled,
        reminder_interval_days,
    })
}

/// Overwrite the AppSettings singleton wholesale
pub async fn save_app_settings(pool: &SqlitePool, settings: &AppSettings) -> Result<()> {
    settings.validate()?;

    let mut tx = pool.begin().await?;
    for (key, value) in [
        (EMAIL_ENABLED_KEY, settings.email_enabled.to_string()),
        (REMINDER_INTERVAL_KEY, settings.reminder_interval_days.to_string()),
    ] {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(
        "Saved settings: email_enabled={}, reminder_interval_days={}",
        settings.email_enabled, settings.reminder_interval_days
    );
    Ok(())
}
