pub mod catalog;
pub mod user;

pub use catalog::CatalogMutations;
pub use user::UserMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::graphql::auth::{AuthExt, AuthGuard};
    pub(crate) use crate::graphql::errors::{auth_error, catalog_error};
    pub(crate) use crate::graphql::types::*;
}
