use super::prelude::*;

#[derive(Default)]
pub struct CatalogQueries;

#[Object]
impl CatalogQueries {
    /// Number of authors in the catalog
    async fn author_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let db = ctx.data_unchecked::<Database>();
        let count = db.authors().count().await?;
        Ok(count as i32)
    }

    /// Every author, in creation order
    async fn all_authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.authors().list().await?;
        Ok(records.into_iter().map(Author::from).collect())
    }

    /// Books, optionally narrowed to a genre and/or an author name
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        genre: Option<String>,
        author: Option<String>,
    ) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let filter = BookFilter { genre, author };
        tracing::debug!(?filter, "allBooks");

        let records = db.books().list(&filter).await?;
        Ok(records.into_iter().map(Book::from).collect())
    }

    /// Books listing the given genre
    async fn filter_with_genre(&self, ctx: &Context<'_>, genre: String) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let filter = BookFilter {
            genre: Some(genre),
            author: None,
        };

        let records = db.books().list(&filter).await?;
        Ok(records.into_iter().map(Book::from).collect())
    }

    async fn find_author(&self, ctx: &Context<'_>, name: String) -> Result<Option<Author>> {
        let db = ctx.data_unchecked::<Database>();
        Ok(db.authors().get_by_name(&name).await?.map(Author::from))
    }

    async fn find_book(&self, ctx: &Context<'_>, title: String) -> Result<Option<Book>> {
        let db = ctx.data_unchecked::<Database>();
        Ok(db.books().get_by_title(&title).await?.map(Book::from))
    }
}
