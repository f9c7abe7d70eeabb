//! API route definitions
//!
//! The primary API is GraphQL at /graphql; /healthz and /readyz are plain REST.

pub mod graphql;
pub mod health;
