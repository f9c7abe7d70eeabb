//! User-visible GraphQL errors
//!
//! Every error a client is expected to handle carries an `extensions.code`:
//! `BAD_USER_INPUT` (with the offending `invalidArgs`) or `UNAUTHENTICATED`.

use async_graphql::{ErrorExtensions, Value};

use crate::services::{AuthError, CatalogError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        invalid_args: serde_json::Value,
    },

    #[error("{0}")]
    Unauthenticated(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, invalid_args: serde_json::Value) -> Self {
        Self::Validation {
            message: message.into(),
            invalid_args,
        }
    }

    pub fn not_authenticated() -> Self {
        Self::Unauthenticated("not authenticated".to_string())
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| match self {
            ApiError::Validation { invalid_args, .. } => {
                e.set("code", "BAD_USER_INPUT");
                e.set(
                    "invalidArgs",
                    Value::from_json(invalid_args.clone()).unwrap_or(Value::Null),
                );
            }
            ApiError::Unauthenticated(_) => e.set("code", "UNAUTHENTICATED"),
        })
    }
}

/// Map a catalog failure; store failures stay generic server errors
pub(crate) fn catalog_error(err: CatalogError, args: serde_json::Value) -> async_graphql::Error {
    match err {
        CatalogError::InvalidInput(message) => ApiError::validation(message, args).extend(),
        CatalogError::Store(e) => async_graphql::Error::new(e.to_string()),
    }
}

pub(crate) fn auth_error(err: AuthError, args: serde_json::Value) -> async_graphql::Error {
    match err {
        AuthError::InvalidInput(message) => ApiError::validation(message, args).extend(),
        AuthError::WrongCredentials | AuthError::InvalidToken(_) => {
            ApiError::Unauthenticated(err.to_string()).extend()
        }
        AuthError::TokenIssue(_) => {
            tracing::error!(error = %err, "Token signing failed");
            async_graphql::Error::new("internal error while issuing token")
        }
        AuthError::Store(e) => async_graphql::Error::new(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn code(err: &async_graphql::Error) -> Option<Value> {
        err.extensions.as_ref().and_then(|e| e.get("code")).cloned()
    }

    #[test]
    fn test_auth_error_codes() {
        let err = auth_error(AuthError::WrongCredentials, serde_json::Value::Null);
        assert_eq!(code(&err), Some(Value::from("UNAUTHENTICATED")));

        let err = auth_error(
            AuthError::InvalidInput("username must be at least 3 characters".to_string()),
            serde_json::json!({ "username": "ab" }),
        );
        assert_eq!(code(&err), Some(Value::from("BAD_USER_INPUT")));
    }

    #[test]
    fn test_token_issue_failure_is_a_server_error() {
        let err = auth_error(
            AuthError::TokenIssue("key rejected".to_string()),
            serde_json::Value::Null,
        );
        assert_eq!(code(&err), None);
        assert!(!err.message.contains("key rejected"));
    }
}
