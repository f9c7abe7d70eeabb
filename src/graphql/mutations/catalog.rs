use super::prelude::*;

use crate::services::{AddBook, CatalogService};

#[derive(Default)]
pub struct CatalogMutations;

#[Object]
impl CatalogMutations {
    /// Add a book, creating its author on first use
    ///
    /// Requires authentication.
    #[graphql(guard = "AuthGuard")]
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        published: i32,
        genres: Option<Vec<String>>,
    ) -> Result<Option<Book>> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        let user = ctx.current_user()?;
        tracing::debug!(user_id = %user.id, %title, %author, "addBook");

        let args = serde_json::json!({
            "title": title,
            "author": author,
            "published": published,
            "genres": genres,
        });

        let input = AddBook {
            title,
            author,
            published,
            genres: genres.unwrap_or_default(),
        };

        match catalog.add_book(input).await {
            Ok(book) => Ok(Some(book.into())),
            Err(e) => {
                tracing::warn!(error = %e, "addBook failed");
                Err(catalog_error(e, args))
            }
        }
    }

    /// Set an author's birth year; null when the author does not exist
    ///
    /// Requires authentication.
    #[graphql(guard = "AuthGuard")]
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        set_born_to: i32,
    ) -> Result<Option<Author>> {
        let catalog = ctx.data_unchecked::<CatalogService>();

        let updated = catalog.edit_author(&name, set_born_to).await.map_err(|e| {
            catalog_error(
                e,
                serde_json::json!({ "name": name, "setBornTo": set_born_to }),
            )
        })?;

        Ok(updated.map(Author::from))
    }
}
