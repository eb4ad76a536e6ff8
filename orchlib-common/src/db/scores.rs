//! Score documents
//!
//! A catalogued work is stored as one Score per part. Bulk creation
//! writes every part or none.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::db::models::{optional, required, NewScores, Score, ScoreInput};
use crate::{uuid_utils, Error, Result};

const SELECT_SCORE: &str =
    "SELECT id, title, composer, part, catalog_number, created_at FROM scores";

fn from_row(row: &SqliteRow) -> Result<Score> {
    Ok(Score {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        composer: row.try_get("composer")?,
        part: row.try_get("part")?,
        catalog_number: row.try_get("catalog_number")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create one Score per selected part in a single transaction.
///
/// Blank and repeated parts are dropped; at least one part must remain.
/// Returns the new scores in the order the parts were given.
pub async fn insert_scores(
    pool: &SqlitePool,
    new: &NewScores,
    now: DateTime<Utc>,
) -> Result<Vec<Score>> {
    let title = required("title", &new.title)?;
    let composer = required("composer", &new.composer)?;
    let catalog_number = optional(new.catalog_number.as_deref());

    let mut parts: Vec<String> = Vec::with_capacity(new.parts.len());
    for part in &new.parts {
        let part = part.trim();
        if !part.is_empty() && !parts.iter().any(|p| p == part) {
            parts.push(part.to_string());
        }
    }
    if parts.is_empty() {
        return Err(Error::Validation("Select at least one part".to_string()));
    }

    let scores: Vec<Score> = parts
        .into_iter()
        .map(|part| Score {
            id: uuid_utils::new_id(),
            title: title.clone(),
            composer: composer.clone(),
            part,
            catalog_number: catalog_number.clone(),
            created_at: now,
        })
        .collect();

    let mut tx = pool.begin().await?;
    for score in &scores {
        sqlx::query(
            r#"
            INSERT INTO scores (id, title, composer, part, catalog_number, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&score.id)
        .bind(&score.title)
        .bind(&score.composer)
        .bind(&score.part)
        .bind(&score.catalog_number)
        .bind(score.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    debug!("Catalogued '{}' with {} part(s)", title, scores.len());
    Ok(scores)
}

pub async fn get_score(pool: &SqlitePool, id: &str) -> Result<Option<Score>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_SCORE))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

pub async fn list_scores(pool: &SqlitePool) -> Result<Vec<Score>> {
    let rows = sqlx::query(SELECT_SCORE).fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

pub async fn update_score(pool: &SqlitePool, id: &str, input: &ScoreInput) -> Result<Score> {
    let input = input.normalized()?;
    let updated = sqlx::query(
        "UPDATE scores SET title = ?, composer = ?, part = ?, catalog_number = ? WHERE id = ?",
    )
    .bind(&input.title)
    .bind(&input.composer)
    .bind(&input.part)
    .bind(&input.catalog_number)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("Score {} not found", id)));
    }

    get_score(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Score {} not found", id)))
}

pub async fn scores_by_ids(
    tx: &mut Transaction<'_, Sqlite>,
    ids: &[String],
) -> Result<Vec<Score>> {
    let mut found = Vec::with_capacity(ids.len());
    for id in ids {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_SCORE))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(row) = row {
            found.push(from_row(&row)?);
        }
    }
    Ok(found)
}

/// Delete `ids`; unknown ids are skipped. Returns the number removed.
pub async fn delete_scores(tx: &mut Transaction<'_, Sqlite>, ids: &[String]) -> Result<u64> {
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM scores WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory_database;

    fn bolero(parts: &[&str]) -> NewScores {
        NewScores {
            title: "Bolero".into(),
            composer: "Maurice Ravel".into(),
            catalog_number: Some("  ".into()),
            parts: parts.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn one_score_per_part_in_given_order() {
        let db = init_in_memory_database().await.unwrap();
        let created = insert_scores(&db, &bolero(&["Viola", "Harp", "Viola", " "]), Utc::now())
            .await
            .unwrap();

        let parts: Vec<&str> = created.iter().map(|s| s.part.as_str()).collect();
        assert_eq!(parts, ["Viola", "Harp"]);
        assert!(created.iter().all(|s| s.catalog_number.is_none()));
        assert_eq!(list_scores(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_parts_is_rejected() {
        let db = init_in_memory_database().await.unwrap();
        let result = insert_scores(&db, &bolero(&[]), Utc::now()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn update_changes_part() {
        let db = init_in_memory_database().await.unwrap();
        let created = insert_scores(&db, &bolero(&["Tuba"]), Utc::now()).await.unwrap();
        let edit = ScoreInput {
            title: "Bolero".into(),
            composer: "Maurice Ravel".into(),
            part: "Bass trombone".into(),
            catalog_number: Some("R-12".into()),
        };

        let updated = update_score(&db, &created[0].id, &edit).await.unwrap();

        assert_eq!(updated.label(), "Bolero - Maurice Ravel (Bass trombone)");
        assert_eq!(updated.catalog_number.as_deref(), Some("R-12"));
    }

    #[tokio::test]
    async fn undecodable_row_is_a_database_error() {
        let db = init_in_memory_database().await.unwrap();
        sqlx::query(
            "INSERT INTO scores (id, title, composer, part, created_at)
             VALUES ('s1', 'Bolero', 'Maurice Ravel', 'Harp', 'last spring')",
        )
        .execute(&db)
        .await
        .unwrap();

        assert!(matches!(list_scores(&db).await, Err(Error::Database(_))));
    }
}
