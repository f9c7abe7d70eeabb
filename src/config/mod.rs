//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Login password accepted for every user when `LOGIN_PASSWORD` is unset
pub const DEFAULT_LOGIN_PASSWORD: &str = "secret";

/// Longest accepted `TOKEN_LIFETIME_SECS`: ten years
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for generating URLs)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite connection URL, e.g. `sqlite:bookshelf.db` or `sqlite::memory:`
    pub database_url: String,

    /// Maximum pooled connections (ignored for in-memory databases)
    pub database_max_connections: u32,

    /// JWT secret for signing and verifying tokens
    pub jwt_secret: String,

    /// Shared password checked by the `login` mutation
    pub login_password: String,

    /// Lifetime of issued tokens in seconds
    pub token_lifetime_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .or_else(|_| env::var("SECRET"))
            .unwrap_or_else(|_| {
                // In production, this should be set explicitly
                use std::collections::hash_map::DefaultHasher;
                use std::hash::{Hash, Hasher};
                let mut hasher = DefaultHasher::new();
                std::time::SystemTime::now().hash(&mut hasher);
                format!("dev-secret-{}", hasher.finish())
            });

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:bookshelf.db".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            jwt_secret: jwt_secret.trim().to_string(),

            login_password: env::var("LOGIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_LOGIN_PASSWORD.to_string()),

            token_lifetime_secs: parse_token_lifetime(
                &env::var("TOKEN_LIFETIME_SECS").unwrap_or_else(|_| (7 * 24 * 60 * 60).to_string()),
            )
            .context("Invalid TOKEN_LIFETIME_SECS")?,
        })
    }

    /// Address shown in startup logs
    pub fn public_url(&self) -> String {
        format!(
            "http://{}:{}/graphql",
            self.host.as_deref().unwrap_or("localhost"),
            self.port
        )
    }
}

/// Token lifetime in seconds, within `1..=MAX_TOKEN_LIFETIME_SECS`
fn parse_token_lifetime(value: &str) -> Result<i64> {
    let secs: i64 = value.trim().parse()?;
    if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&secs) {
        anyhow::bail!(
            "{} is out of range (1..={} seconds)",
            secs,
            MAX_TOKEN_LIFETIME_SECS
        );
    }
    Ok(secs)
}
