//! Bookshelf server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf::config::Config;
use bookshelf::db::Database;
use bookshelf::{AppState, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    tracing::info!(url = %config.database_url, "Connecting to database");
    let db = match Database::connect(&config.database_url, config.database_max_connections).await
    {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Error connecting to database");
            return Err(e);
        }
    };
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    let state = AppState::new(config.clone(), db);
    tracing::info!("GraphQL schema built");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server ready at {}", config.public_url());
    tracing::info!(
        "Subscriptions ready at {}",
        config.public_url().replacen("http", "ws", 1) + "/ws"
    );

    axum::serve(listener, app(state)).await?;

    Ok(())
}
