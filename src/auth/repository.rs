use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::RefreshTokenModel;
use crate::shared::StorageError;

/// Persistence capability for refresh tokens
#[async_trait]
pub trait RefreshTokenRepository {
    async fn insert(&self, token: &RefreshTokenModel) -> Result<(), StorageError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, StorageError>;
    /// Sets `revoked_at` if unset. Returns false when no such token exists.
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;
}

/// In-memory implementation of RefreshTokenRepository for development and testing
///
/// Data is lost when the process exits.
pub struct InMemoryRefreshTokenRepository {
    tokens: Mutex<HashMap<String, RefreshTokenModel>>,
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a repository pre-populated with records
    pub fn with_tokens(tokens: Vec<RefreshTokenModel>) -> Self {
        let token_map = tokens
            .into_iter()
            .map(|model| (model.token.clone(), model))
            .collect();

        Self {
            tokens: Mutex::new(token_map),
        }
    }

    pub fn token_count(&self) -> usize {
        self.lock().map(|tokens| tokens.len()).unwrap_or(0)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, RefreshTokenModel>>, StorageError> {
        self.tokens
            .lock()
            .map_err(|_| StorageError::Database("refresh token store poisoned".to_string()))
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn insert(&self, token: &RefreshTokenModel) -> Result<(), StorageError> {
        debug!(user_id = %token.user_id, "Storing refresh token in memory");

        let mut tokens = self.lock()?;
        if tokens.contains_key(&token.token) {
            warn!(user_id = %token.user_id, "Refresh token already exists in memory");
            return Err(StorageError::Conflict("refresh token already exists".to_string()));
        }
        tokens.insert(token.token.clone(), token.clone());

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, StorageError> {
        let tokens = self.lock()?;
        let found = tokens.get(token).cloned();

        match &found {
            Some(model) => debug!(user_id = %model.user_id, "Refresh token found in memory"),
            None => debug!("Refresh token not found in memory"),
        }

        Ok(found)
    }

    #[instrument(skip(self, token))]
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let mut tokens = self.lock()?;
        match tokens.get_mut(token) {
            Some(model) => {
                model.revoke(at);
                debug!(user_id = %model.user_id, "Refresh token revoked in memory");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// PostgreSQL implementation of the refresh token repository
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn insert(&self, token: &RefreshTokenModel) -> Result<(), StorageError> {
        debug!(user_id = %token.user_id, "Storing refresh token in database");

        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store refresh token in database");
            StorageError::from(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, StorageError> {
        let row = sqlx::query(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at FROM refresh_tokens WHERE token = $1"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch refresh token from database");
            StorageError::from(e)
        })?;

        Ok(row.map(|row| RefreshTokenModel {
            token: row.get("token"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            expires_at: row.get("expires_at"),
            revoked_at: row.get("revoked_at"),
        }))
    }

    #[instrument(skip(self, token))]
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        // Single-row update; COALESCE keeps the first revocation time.
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, $2), updated_at = $2 WHERE token = $1"
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to revoke refresh token in database");
            StorageError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
