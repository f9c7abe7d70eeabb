//! Book database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::SqlitePool as Pool;
use uuid::Uuid;

use super::sqlite_helpers::{
    decode_err, json_array_contains_sql, json_to_vec, now_iso8601, str_to_datetime, str_to_uuid,
    uuid_to_str, vec_to_json,
};

const BOOK_COLUMNS: &str = "b.id, b.title, b.published, b.author_id, b.genres, b.created_at";

/// Book record from database
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub published: i32,
    pub author_id: Uuid,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for BookRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let id_str: String = row.try_get("id")?;
        let author_id_str: String = row.try_get("author_id")?;
        let genres_json: String = row.try_get("genres")?;
        let created_str: String = row.try_get("created_at")?;

        Ok(Self {
            id: str_to_uuid(&id_str).map_err(decode_err)?,
            title: row.try_get("title")?,
            published: row.try_get("published")?,
            author_id: str_to_uuid(&author_id_str).map_err(decode_err)?,
            genres: json_to_vec(&genres_json),
            created_at: str_to_datetime(&created_str).map_err(decode_err)?,
        })
    }
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub published: i32,
    pub author_id: Uuid,
    pub genres: Vec<String>,
}

/// Optional filters for listing books; set filters are ANDed
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Book must list this genre
    pub genre: Option<String>,
    /// Owning author must have exactly this name
    pub author: Option<String>,
}

pub struct BookRepository {
    pool: Pool,
}

impl BookRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new book. Titles are unique.
    pub async fn create(&self, book: CreateBook) -> Result<BookRecord> {
        let mut conn = self.pool.acquire().await?;
        create_on(&mut conn, book).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<BookRecord>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = ?"
        ))
        .bind(uuid_to_str(id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<BookRecord>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.title = ?"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List books in creation order, narrowed by `filter`
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>> {
        let mut conditions = Vec::new();
        if filter.genre.is_some() {
            conditions.push(json_array_contains_sql("b.genres"));
        }
        if filter.author.is_some() {
            conditions.push("a.name = ?".to_string());
        }

        let mut sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b JOIN authors a ON a.id = b.author_id"
        );
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY b.rowid");

        let mut query = sqlx::query_as::<_, BookRecord>(&sql);
        if let Some(genre) = &filter.genre {
            query = query.bind(genre);
        }
        if let Some(author) = &filter.author {
            query = query.bind(author);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

/// Insert a book on a caller-held connection, e.g. an open transaction
pub async fn create_on(conn: &mut SqliteConnection, book: CreateBook) -> Result<BookRecord> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO books (id, title, published, author_id, genres, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid_to_str(id))
    .bind(&book.title)
    .bind(book.published)
    .bind(uuid_to_str(book.author_id))
    .bind(vec_to_json(&book.genres))
    .bind(now_iso8601())
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, BookRecord>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = ?"
    ))
    .bind(uuid_to_str(id))
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| anyhow::anyhow!("Failed to create book"))
}
