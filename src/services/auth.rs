//! Authentication service for user management and JWT handling
//!
//! Provides:
//! - User creation
//! - Login against the shared password
//! - JWT token generation and validation
//! - Resolving the current user from an `Authorization` header

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_LOGIN_PASSWORD};
use crate::db::sqlite_helpers::is_unique_violation;
use crate::db::{CreateUser, Database, UserRecord};

/// Shortest accepted username
pub const MIN_USERNAME_LEN: usize = 3;

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims carried by a login token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub username: String,
    /// User ID
    pub id: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad input or a rejected write, e.g. a taken username
    #[error("{0}")]
    InvalidInput(String),

    #[error("wrong credentials")]
    WrongCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Server-side failure while issuing a token
    #[error("failed to issue token: {0}")]
    TokenIssue(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// The one password `login` accepts
    pub login_password: String,
    /// Token lifetime in seconds
    pub token_lifetime_secs: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            login_password: DEFAULT_LOGIN_PASSWORD.to_string(),
            token_lifetime_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            login_password: config.login_password.clone(),
            token_lifetime_secs: config.token_lifetime_secs,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a new user
    pub async fn create_user(
        &self,
        username: &str,
        favorite_genres: Vec<String>,
    ) -> Result<UserRecord, AuthError> {
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::InvalidInput(format!(
                "username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }

        let input = CreateUser {
            username: username.to_string(),
            favorite_genres,
        };

        self.db.users().create(input).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::InvalidInput(format!("username '{}' is already taken", username))
            } else {
                AuthError::InvalidInput(e.to_string())
            }
        })
    }

    /// Check the credentials and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self.db.users().get_by_username(username).await?;

        match user {
            Some(user) if password == self.config.login_password => self.sign_token(&user),
            _ => Err(AuthError::WrongCredentials),
        }
    }

    /// Sign a token for a user
    pub fn sign_token(&self, user: &UserRecord) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.config.token_lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenIssue(format!(
                    "token lifetime of {}s is out of range",
                    self.config.token_lifetime_secs
                ))
            })?;

        let claims = TokenClaims {
            username: user.username.clone(),
            id: user.id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenIssue(e.to_string()))?;

        Ok(token)
    }

    /// Verify a token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }

    /// Resolve the caller from an `Authorization` header value.
    ///
    /// Anything short of a valid bearer token for an existing user yields
    /// `None`; resolvers that need a caller reject the request themselves.
    pub async fn current_user(&self, authorization: Option<&str>) -> Option<UserRecord> {
        let token = authorization.and_then(extract_bearer)?;
        self.user_for_token(token).await
    }

    /// Resolve the user a raw token was issued to
    pub async fn user_for_token(&self, token: &str) -> Option<UserRecord> {
        let claims = match self.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
                return None;
            }
        };

        let id = Uuid::parse_str(&claims.id).ok()?;
        match self.db.users().get_by_id(id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %id, "Failed to load token user");
                None
            }
        }
    }
}

/// Strip a case-insensitive `Bearer ` prefix
pub fn extract_bearer(header: &str) -> Option<&str> {
    let prefix = header.get(..7)?;
    if prefix.eq_ignore_ascii_case("bearer ") {
        Some(header[7..].trim())
    } else {
        None
    }
}
