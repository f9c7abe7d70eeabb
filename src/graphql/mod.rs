//! GraphQL API with subscriptions for real-time updates
//!
//! Queries and mutations are split by domain under `queries/` and
//! `mutations/` and merged into the roots in `schema.rs`.

pub mod auth;
pub mod errors;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::{AuthExt, AuthGuard, CurrentUser};
pub use errors::ApiError;
pub use schema::{BookshelfSchema, MutationRoot, QueryRoot, build_schema};
pub use subscriptions::SubscriptionRoot;
