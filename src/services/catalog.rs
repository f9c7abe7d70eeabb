//! Catalog service: book and author mutations plus the book-added feed.
//!
//! `add_book` publishes every created book on a [BookAddedBroker]; the
//! `bookAdded` subscription reads from the same broker.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::db::{AuthorRecord, BookRecord, CreateBook, Database, authors, books};
use crate::db::sqlite_helpers::is_unique_violation;

/// Shortest accepted book title
pub const MIN_TITLE_LEN: usize = 2;
/// Shortest accepted name for a newly created author
pub const MIN_AUTHOR_NAME_LEN: usize = 4;

const BROKER_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Bad input or a rejected write, e.g. a duplicate title
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Fan-out of newly created books to every live subscriber
pub struct BookAddedBroker {
    sender: broadcast::Sender<BookRecord>,
}

impl BookAddedBroker {
    pub fn new(cap: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(cap);
        Arc::new(Self { sender })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookRecord> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers; a send with none listening is dropped
    pub fn send(&self, book: BookRecord) {
        let _ = self.sender.send(book);
    }
}

/// Input for `add_book`
#[derive(Debug, Clone)]
pub struct AddBook {
    pub title: String,
    /// Author name; created when unknown
    pub author: String,
    pub published: i32,
    pub genres: Vec<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    broker: Arc<BookAddedBroker>,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            broker: BookAddedBroker::new(BROKER_CAPACITY),
        }
    }

    pub fn broker(&self) -> &Arc<BookAddedBroker> {
        &self.broker
    }

    /// Create a book, creating its author on first use, and announce it.
    ///
    /// The author upsert, the book insert and the link run in one
    /// transaction; a failure at any step leaves the store untouched and
    /// publishes nothing.
    pub async fn add_book(&self, input: AddBook) -> Result<BookRecord, CatalogError> {
        if input.title.chars().count() < MIN_TITLE_LEN {
            return Err(CatalogError::InvalidInput(format!(
                "Title of the book is too short (minimum {} characters)",
                MIN_TITLE_LEN
            )));
        }

        let known_author = self.db.authors().get_by_name(&input.author).await?.is_some();
        if !known_author && input.author.chars().count() < MIN_AUTHOR_NAME_LEN {
            return Err(CatalogError::InvalidInput(format!(
                "Name of the author is too short (minimum {} characters)",
                MIN_AUTHOR_NAME_LEN
            )));
        }

        let mut tx = self.db.begin().await?;

        let (author, author_created) = authors::find_or_create_on(&mut tx, &input.author)
            .await
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;

        let book = books::create_on(
            &mut tx,
            CreateBook {
                title: input.title.clone(),
                published: input.published,
                author_id: author.id,
                genres: input.genres,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::InvalidInput(format!(
                    "A book titled '{}' already exists",
                    input.title
                ))
            } else {
                CatalogError::InvalidInput(e.to_string())
            }
        })?;

        authors::append_book_on(&mut tx, author.id, book.id)
            .await
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;

        if author_created {
            tracing::info!(author_id = %author.id, name = %author.name, "Author created");
        }
        tracing::info!(
            book_id = %book.id,
            title = %book.title,
            author = %author.name,
            "Book added"
        );

        self.broker.send(book.clone());
        Ok(book)
    }

    /// Set an author's birth year; `None` when the author does not exist
    pub async fn edit_author(
        &self,
        name: &str,
        born: i32,
    ) -> Result<Option<AuthorRecord>, CatalogError> {
        let updated = self
            .db
            .authors()
            .set_born(name, born)
            .await
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;

        match &updated {
            Some(author) => tracing::info!(author_id = %author.id, born, "Author updated"),
            None => tracing::debug!(name, "editAuthor: no such author"),
        }

        Ok(updated)
    }
}
