//! Bookshelf - GraphQL API for a book and author catalog
//!
//! All catalog operations are exposed via GraphQL at /graphql, with
//! subscriptions on /graphql/ws.

pub mod api;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::BookshelfSchema;
use crate::services::{AuthConfig, AuthService, CatalogService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: BookshelfSchema,
    pub auth: AuthService,
}

impl AppState {
    /// Wire services and schema on top of a connected database
    pub fn new(config: Arc<Config>, db: Database) -> Self {
        let auth = AuthService::new(db.clone(), AuthConfig::from(config.as_ref()));
        let catalog = CatalogService::new(db.clone());
        let schema = graphql::build_schema(db.clone(), auth.clone(), catalog);

        Self {
            config,
            db,
            schema,
            auth,
        }
    }
}

/// Build the HTTP router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::graphql::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
