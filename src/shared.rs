use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{AuthError, AuthService, RefreshTokenError};
use crate::chirps::repository::ChirpRepository;
use crate::users::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: Arc<dyn UserRepository + Send + Sync>,
    pub chirps: Arc<dyn ChirpRepository + Send + Sync>,
    pub polka_key: String,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        users: Arc<dyn UserRepository + Send + Sync>,
        chirps: Arc<dyn ChirpRepository + Send + Sync>,
        polka_key: String,
    ) -> Self {
        Self {
            auth,
            users,
            chirps,
            polka_key,
        }
    }
}

/// Failures reported by the persistence collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        let unique_violation = e
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == "23505");

        if unique_violation {
            StorageError::Conflict(e.to_string())
        } else {
            StorageError::Database(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Auth(e) => match e {
                // Never say which half of the pair was wrong.
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Incorrect email or password".to_string(),
                ),
                AuthError::Credential(_) => (
                    StatusCode::UNAUTHORIZED,
                    "Missing or malformed authorization header".to_string(),
                ),
                AuthError::Unauthorized(_) => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ),
                AuthError::InvalidServiceKey => {
                    (StatusCode::UNAUTHORIZED, "API key not valid".to_string())
                }
                AuthError::RefreshToken(
                    RefreshTokenError::NotFound
                    | RefreshTokenError::Revoked
                    | RefreshTokenError::Expired,
                ) => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired refresh token".to_string(),
                ),
                AuthError::RefreshToken(_)
                | AuthError::TokenIssue(_)
                | AuthError::Hashing(_)
                | AuthError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            AppError::Storage(StorageError::Conflict(_)) => (
                StatusCode::CONFLICT,
                "Resource already exists".to_string(),
            ),
            AppError::Storage(StorageError::Database(_)) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
