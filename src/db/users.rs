//! Users repository
//!
//! Users carry no password; `login` checks a shared password instead.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool as Pool;
use uuid::Uuid;

use super::sqlite_helpers::{
    decode_err, json_to_vec, now_iso8601, str_to_datetime, str_to_uuid, uuid_to_str, vec_to_json,
};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub favorite_genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for UserRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let id_str: String = row.try_get("id")?;
        let genres_json: String = row.try_get("favorite_genres")?;
        let created_str: String = row.try_get("created_at")?;

        Ok(Self {
            id: str_to_uuid(&id_str).map_err(decode_err)?,
            username: row.try_get("username")?,
            favorite_genres: json_to_vec(&genres_json),
            created_at: str_to_datetime(&created_str).map_err(decode_err)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub favorite_genres: Vec<String>,
}

pub struct UsersRepository {
    pool: Pool,
}

impl UsersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// Fails with a UNIQUE violation (see `is_unique_violation`) when the
    /// username is taken.
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, favorite_genres, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(uuid_to_str(id))
        .bind(&user.username)
        .bind(vec_to_json(&user.favorite_genres))
        .bind(now_iso8601())
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, favorite_genres, created_at FROM users WHERE id = ?",
        )
        .bind(uuid_to_str(id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Get user by username (exact match)
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, favorite_genres, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
