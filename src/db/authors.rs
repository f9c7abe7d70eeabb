//! Author database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::SqlitePool as Pool;
use uuid::Uuid;

use super::sqlite_helpers::{
    decode_err, json_to_vec, now_iso8601, str_to_datetime, str_to_uuid, uuid_to_str,
};

const AUTHOR_COLUMNS: &str = "id, name, born, book_ids, created_at, updated_at";

/// Author record from database
#[derive(Debug, Clone)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub name: String,
    pub born: Option<i32>,
    /// Owned books, in the order they were added
    pub book_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthorRecord {
    pub fn book_count(&self) -> usize {
        self.book_ids.len()
    }
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for AuthorRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let id_str: String = row.try_get("id")?;
        let book_ids_json: String = row.try_get("book_ids")?;
        let created_str: String = row.try_get("created_at")?;
        let updated_str: String = row.try_get("updated_at")?;

        let book_ids = json_to_vec::<String>(&book_ids_json)
            .iter()
            .map(|s| str_to_uuid(s))
            .collect::<Result<Vec<_>>>()
            .map_err(decode_err)?;

        Ok(Self {
            id: str_to_uuid(&id_str).map_err(decode_err)?,
            name: row.try_get("name")?,
            born: row.try_get("born")?,
            book_ids,
            created_at: str_to_datetime(&created_str).map_err(decode_err)?,
            updated_at: str_to_datetime(&updated_str).map_err(decode_err)?,
        })
    }
}

pub struct AuthorRepository {
    pool: Pool,
}

impl AuthorRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Number of authors
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// All authors in creation order
    pub async fn list(&self) -> Result<Vec<AuthorRecord>> {
        let records = sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?"
        ))
        .bind(uuid_to_str(id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Return the author with this name, creating it if needed.
    ///
    /// The flag is true only for the caller whose insert went through.
    pub async fn find_or_create(&self, name: &str) -> Result<(AuthorRecord, bool)> {
        let mut conn = self.pool.acquire().await?;
        find_or_create_on(&mut conn, name).await
    }

    /// Set the birth year of the named author, returning the updated record
    /// or `None` when no author has that name.
    pub async fn set_born(&self, name: &str, born: i32) -> Result<Option<AuthorRecord>> {
        let result = sqlx::query("UPDATE authors SET born = ?, updated_at = ? WHERE name = ?")
            .bind(born)
            .bind(now_iso8601())
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_name(name).await
    }

    /// Append a book id to the author's book list in place
    pub async fn append_book(&self, author_id: Uuid, book_id: Uuid) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        append_book_on(&mut conn, author_id, book_id).await
    }
}

// Statements below take a caller-held connection so they can share a transaction.

/// Insert-or-ignore on the UNIQUE `name`, then read the row back.
///
/// Concurrent callers racing on the same new name all end up with the same
/// row. Run inside a transaction, the insert is its first statement, so the
/// write lock is taken before anything is read.
pub async fn find_or_create_on(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(AuthorRecord, bool)> {
    let now = now_iso8601();

    let result = sqlx::query(
        r#"
        INSERT INTO authors (id, name, born, book_ids, created_at, updated_at)
        VALUES (?, ?, NULL, '[]', ?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(uuid_to_str(Uuid::new_v4()))
    .bind(name)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    let record = sqlx::query_as::<_, AuthorRecord>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors WHERE name = ?"
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| anyhow::anyhow!("Author '{}' vanished after upsert", name))?;

    Ok((record, result.rows_affected() == 1))
}

pub async fn append_book_on(
    conn: &mut SqliteConnection,
    author_id: Uuid,
    book_id: Uuid,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE authors
        SET book_ids = json_insert(book_ids, '$[#]', ?), updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(uuid_to_str(book_id))
    .bind(now_iso8601())
    .bind(uuid_to_str(author_id))
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Author {} not found", author_id);
    }

    Ok(())
}
