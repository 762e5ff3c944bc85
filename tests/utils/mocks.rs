use async_trait::async_trait;
use chrono::{DateTime, Utc};

use chirpy::auth::{models::RefreshTokenModel, repository::RefreshTokenRepository};
use chirpy::StorageError;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Refresh token store whose backing database is always down
pub struct FailingRefreshTokenRepository;

#[async_trait]
impl RefreshTokenRepository for FailingRefreshTokenRepository {
    async fn insert(&self, _token: &RefreshTokenModel) -> Result<(), StorageError> {
        Err(StorageError::Database("connection refused".to_string()))
    }

    async fn find_by_token(&self, _token: &str) -> Result<Option<RefreshTokenModel>, StorageError> {
        Err(StorageError::Database("connection refused".to_string()))
    }

    async fn mark_revoked(&self, _token: &str, _at: DateTime<Utc>) -> Result<bool, StorageError> {
        Err(StorageError::Database("connection refused".to_string()))
    }
}
