use chrono::Utc;
use rand::rngs::OsRng;
use rand::TryRngCore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::errors::RefreshTokenError;
use super::models::{RefreshTokenModel, RefreshTokenState};
use super::repository::RefreshTokenRepository;

const REFRESH_TOKEN_BYTES: usize = 32;

/// 32 bytes from the OS RNG, hex encoded to 64 chars
pub fn generate_refresh_token() -> Result<String, RefreshTokenError> {
    let mut key = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut key)
        .map_err(|e| RefreshTokenError::Generation(e.to_string()))?;

    Ok(hex::encode(key))
}

/// Issues, resolves and revokes opaque refresh tokens.
///
/// Expiry is only ever detected when a token is resolved; nothing sweeps
/// stale rows.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository + Send + Sync>,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshTokenModel, RefreshTokenError> {
        let model = RefreshTokenModel::new(generate_refresh_token()?, user_id);
        self.repository.insert(&model).await?;

        info!(
            user_id = %user_id,
            expires_at = %model.expires_at,
            "Refresh token issued"
        );
        Ok(model)
    }

    /// Returns the owning user of an active token
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let model = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or_else(|| {
                debug!("Refresh token does not exist");
                RefreshTokenError::NotFound
            })?;

        match model.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(model.user_id),
            RefreshTokenState::Revoked => {
                warn!(user_id = %model.user_id, "Revoked refresh token presented");
                Err(RefreshTokenError::Revoked)
            }
            RefreshTokenState::Expired => {
                debug!(user_id = %model.user_id, "Expired refresh token presented");
                Err(RefreshTokenError::Expired)
            }
        }
    }

    /// Revoking an already revoked token is a no-op
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        if !self.repository.mark_revoked(token, Utc::now()).await? {
            return Err(RefreshTokenError::NotFound);
        }

        info!("Refresh token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::InMemoryRefreshTokenRepository;
    use chrono::Duration;

    fn store_with(repo: Arc<InMemoryRefreshTokenRepository>) -> RefreshTokenStore {
        RefreshTokenStore::new(repo)
    }

    #[test]
    fn test_generated_token_shape() {
        let token = generate_refresh_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(token, generate_refresh_token().unwrap());
    }

    #[tokio::test]
    async fn test_issue_persists_record() {
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        let store = store_with(repo.clone());
        let user_id = Uuid::new_v4();

        let issued = store.issue(user_id).await.unwrap();

        assert_eq!(repo.token_count(), 1);
        let stored = repo.find_by_token(&issued.token).await.unwrap().unwrap();
        assert_eq!(stored.user_id, user_id);
        assert_eq!(stored.revoked_at, None);
        let lifetime = stored.expires_at - Utc::now();
        assert!(lifetime > Duration::days(59) && lifetime <= Duration::days(60));
    }

    #[tokio::test]
    async fn test_resolve_active_token() {
        let store = store_with(Arc::new(InMemoryRefreshTokenRepository::new()));
        let user_id = Uuid::new_v4();
        let issued = store.issue(user_id).await.unwrap();

        assert_eq!(store.resolve(&issued.token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let store = store_with(Arc::new(InMemoryRefreshTokenRepository::new()));
        let result = store.resolve(&"0".repeat(64)).await;
        assert!(matches!(result, Err(RefreshTokenError::NotFound)));
    }

    #[tokio::test]
    async fn test_revoked_token_stays_revoked() {
        let store = store_with(Arc::new(InMemoryRefreshTokenRepository::new()));
        let issued = store.issue(Uuid::new_v4()).await.unwrap();

        store.revoke(&issued.token).await.unwrap();
        store.revoke(&issued.token).await.unwrap();

        for _ in 0..5 {
            let result = store.resolve(&issued.token).await;
            assert!(matches!(result, Err(RefreshTokenError::Revoked)));
        }
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let mut model = RefreshTokenModel::new(generate_refresh_token().unwrap(), Uuid::new_v4());
        model.expires_at = Utc::now() - Duration::seconds(1);
        let repo = Arc::new(InMemoryRefreshTokenRepository::with_tokens(vec![model.clone()]));
        let store = store_with(repo);

        let result = store.resolve(&model.token).await;
        assert!(matches!(result, Err(RefreshTokenError::Expired)));
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let store = store_with(Arc::new(InMemoryRefreshTokenRepository::new()));
        let result = store.revoke("does-not-exist").await;
        assert!(matches!(result, Err(RefreshTokenError::NotFound)));
    }
}
