use super::prelude::*;

use crate::services::AuthService;

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Create a user account
    ///
    /// A single genre string is accepted and read as a one-element list.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        favorite_genre: Vec<String>,
    ) -> Result<Option<User>> {
        let auth = ctx.data_unchecked::<AuthService>();

        match auth.create_user(&username, favorite_genre.clone()).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User created");
                Ok(Some(user.into()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "User creation failed");
                Err(auth_error(
                    e,
                    serde_json::json!({ "username": username, "favoriteGenre": favorite_genre }),
                ))
            }
        }
    }

    /// Exchange credentials for a token
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<Option<Token>> {
        let auth = ctx.data_unchecked::<AuthService>();

        match auth.login(&username, &password).await {
            Ok(value) => {
                tracing::info!(%username, "User logged in");
                Ok(Some(Token { value }))
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Login failed");
                Err(auth_error(e, serde_json::json!({ "username": username })))
            }
        }
    }
}
