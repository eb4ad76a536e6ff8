//! Musician documents

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::db::models::{Musician, MusicianInput};
use crate::{uuid_utils, Error, Result};

const SELECT_MUSICIAN: &str =
    "SELECT id, first_name, last_name, email, phone, instrument, created_at FROM musicians";

fn from_row(row: &SqliteRow) -> Result<Musician> {
    Ok(Musician {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        instrument: row.try_get("instrument")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Validate and store a new musician
pub async fn insert_musician(
    pool: &SqlitePool,
    input: &MusicianInput,
    now: DateTime<Utc>,
) -> Result<Musician> {
    let input = input.normalized()?;
    let musician = Musician {
        id: uuid_utils::new_id(),
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        instrument: input.instrument,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO musicians (id, first_name, last_name, email, phone, instrument, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&musician.id)
    .bind(&musician.first_name)
    .bind(&musician.last_name)
    .bind(&musician.email)
    .bind(&musician.phone)
    .bind(&musician.instrument)
    .bind(musician.created_at)
    .execute(pool)
    .await?;

    Ok(musician)
}

pub async fn get_musician(pool: &SqlitePool, id: &str) -> Result<Option<Musician>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_MUSICIAN))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// All musicians in storage order; callers sort
pub async fn list_musicians(pool: &SqlitePool) -> Result<Vec<Musician>> {
    let rows = sqlx::query(SELECT_MUSICIAN).fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

/// Overwrite the editable fields of an existing musician
pub async fn update_musician(
    pool: &SqlitePool,
    id: &str,
    input: &MusicianInput,
) -> Result<Musician> {
    let input = input.normalized()?;
    let updated = sqlx::query(
        r#"
        UPDATE musicians
        SET first_name = ?, last_name = ?, email = ?, phone = ?, instrument = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.instrument)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("Musician {} not found", id)));
    }

    get_musician(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Musician {} not found", id)))
}

/// Musicians among `ids`, read inside a batch-delete transaction
pub async fn musicians_by_ids(
    tx: &mut Transaction<'_, Sqlite>,
    ids: &[String],
) -> Result<Vec<Musician>> {
    let mut found = Vec::with_capacity(ids.len());
    for id in ids {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_MUSICIAN))
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
pub async fn delete_musicians(tx: &mut Transaction<'_, Sqlite>, ids: &[String]) -> Result<u64> {
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM musicians WHERE id = ?")
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

    fn input(first: &str, last: &str) -> MusicianInput {
        MusicianInput {
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.org", first.to_lowercase()),
            phone: None,
            instrument: "Viola".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let db = init_in_memory_database().await.unwrap();
        let created = insert_musician(&db, &input("Anna", "Nowak"), Utc::now())
            .await
            .unwrap();

        let fetched = get_musician(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name(), "Anna Nowak");
        assert_eq!(fetched.phone, None);
    }

    #[tokio::test]
    async fn invalid_input_is_not_stored() {
        let db = init_in_memory_database().await.unwrap();
        let result = insert_musician(&db, &input("", "Nowak"), Utc::now()).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(list_musicians(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let db = init_in_memory_database().await.unwrap();
        let result = update_musician(&db, "nope", &input("Anna", "Nowak")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let db = init_in_memory_database().await.unwrap();
        let created = insert_musician(&db, &input("Anna", "Nowak"), Utc::now())
            .await
            .unwrap();

        let mut edit = input("Anna", "Kowalska");
        edit.phone = Some(" 555 123 ".into());
        let updated = update_musician(&db, &created.id, &edit).await.unwrap();

        assert_eq!(updated.last_name, "Kowalska");
        assert_eq!(updated.phone.as_deref(), Some("555 123"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_skips_unknown_ids() {
        let db = init_in_memory_database().await.unwrap();
        let a = insert_musician(&db, &input("Anna", "Nowak"), Utc::now())
            .await
            .unwrap();

        let mut tx = db.begin().await.unwrap();
        let removed = delete_musicians(&mut tx, &[a.id.clone(), "ghost".to_string()])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(removed, 1);
        assert!(get_musician(&db, &a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_row_is_a_database_error() {
        let db = init_in_memory_database().await.unwrap();
        sqlx::query(
            "INSERT INTO musicians (id, first_name, last_name, email, instrument, created_at)
             VALUES ('m1', 'Anna', 'Nowak', 'anna@example.org', 'Viola', 'yesterday')",
        )
        .execute(&db)
        .await
        .unwrap();

        assert!(matches!(list_musicians(&db).await, Err(Error::Database(_))));
        assert!(matches!(get_musician(&db, "m1").await, Err(Error::Database(_))));
    }
}
