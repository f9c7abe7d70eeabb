//! Business logic shared by the GraphQL resolvers

pub mod auth;
pub mod catalog;

pub use auth::{AuthConfig, AuthError, AuthService, TokenClaims};
pub use catalog::{AddBook, BookAddedBroker, CatalogError, CatalogService};
