//! GraphQL authentication
//!
//! The HTTP and WebSocket handlers resolve the caller once per request and
//! attach it as [CurrentUser]. Resolvers read it through [AuthExt].
//!
//! ## Guards
//!
//! Use `AuthGuard` to require authentication on any GraphQL operation:
//!
//! ```ignore
//! #[graphql(guard = "AuthGuard")]
//! async fn protected_mutation(&self, ctx: &Context<'_>) -> Result<Book> { ... }
//! ```

use async_graphql::{Context, ErrorExtensions, Result};

use crate::db::UserRecord;

use super::errors::ApiError;

/// The authenticated caller of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

/// Extension trait to get the current user from GraphQL context
pub trait AuthExt {
    /// Get the current user, or an `UNAUTHENTICATED` error
    fn current_user(&self) -> Result<&UserRecord>;

    /// Get the current user if present
    fn try_current_user(&self) -> Option<&UserRecord>;
}

impl<'a> AuthExt for Context<'a> {
    fn current_user(&self) -> Result<&UserRecord> {
        self.try_current_user()
            .ok_or_else(|| ApiError::not_authenticated().extend())
    }

    fn try_current_user(&self) -> Option<&UserRecord> {
        self.data_opt::<CurrentUser>().map(|user| &user.0)
    }
}

/// Guard that requires authentication for GraphQL operations.
pub struct AuthGuard;

impl async_graphql::Guard for AuthGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let result = ctx.current_user().map(|_| ());
        async move { result }
    }
}
