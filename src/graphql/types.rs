//! GraphQL object types

use async_graphql::{ComplexObject, Context, ID, Result, SimpleObject};
use uuid::Uuid;

use crate::db::{AuthorRecord, BookRecord, Database, UserRecord};

#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: ID,
    pub username: String,
    pub favorite_genre: Vec<String>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: ID(r.id.to_string()),
            username: r.username,
            favorite_genre: r.favorite_genres,
        }
    }
}

/// A signed login token, sent back as `Authorization: Bearer <value>`
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub value: String,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Author {
    pub id: ID,
    pub name: String,
    pub born: Option<i32>,
    pub book_count: i32,
    #[graphql(skip)]
    pub book_ids: Vec<Uuid>,
}

impl From<AuthorRecord> for Author {
    fn from(r: AuthorRecord) -> Self {
        Self {
            id: ID(r.id.to_string()),
            name: r.name,
            born: r.born,
            book_count: r.book_ids.len() as i32,
            book_ids: r.book_ids,
        }
    }
}

#[ComplexObject]
impl Author {
    /// Books by this author, in the order they were added
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let repo = db.books();

        let mut books = Vec::with_capacity(self.book_ids.len());
        for id in &self.book_ids {
            if let Some(book) = repo.get_by_id(*id).await? {
                books.push(book.into());
            }
        }
        Ok(books)
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Book {
    pub id: ID,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    #[graphql(skip)]
    pub author_id: Uuid,
}

impl From<BookRecord> for Book {
    fn from(r: BookRecord) -> Self {
        Self {
            id: ID(r.id.to_string()),
            title: r.title,
            published: r.published,
            genres: r.genres,
            author_id: r.author_id,
        }
    }
}

#[ComplexObject]
impl Book {
    async fn author(&self, ctx: &Context<'_>) -> Result<Author> {
        let db = ctx.data_unchecked::<Database>();
        db.authors()
            .get_by_id(self.author_id)
            .await?
            .map(Author::from)
            .ok_or_else(|| {
                async_graphql::Error::new(format!("Author {} not found", self.author_id))
            })
    }
}
