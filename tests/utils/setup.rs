use axum::Router;
use std::sync::Arc;

use chirpy::{
    auth::{
        repository::{InMemoryRefreshTokenRepository, RefreshTokenRepository},
        AccessTokenCodec, AuthService, RefreshTokenStore, SecretHasher,
    },
    chirps::repository::InMemoryChirpRepository,
    router,
    users::repository::InMemoryUserRepository,
    AppState,
};

pub const TEST_JWT_SECRET: &str = "integration-jwt-secret";
pub const TEST_POLKA_KEY: &str = "integration-polka-key";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub router: Router,
    pub chirps: Arc<InMemoryChirpRepository>,
    pub codec: AccessTokenCodec,
}

pub struct TestSetupBuilder {
    refresh_tokens: Option<Arc<dyn RefreshTokenRepository + Send + Sync>>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            refresh_tokens: None,
        }
    }

    pub fn with_refresh_tokens(
        mut self,
        repo: Arc<dyn RefreshTokenRepository + Send + Sync>,
    ) -> Self {
        self.refresh_tokens = Some(repo);
        self
    }

    pub fn build(self) -> TestSetup {
        let users = Arc::new(InMemoryUserRepository::new());
        let chirps = Arc::new(InMemoryChirpRepository::new());
        let refresh_tokens = self
            .refresh_tokens
            .unwrap_or_else(|| Arc::new(InMemoryRefreshTokenRepository::new()));
        let codec = AccessTokenCodec::new(TEST_JWT_SECRET);

        let auth = AuthService::new(
            users.clone(),
            RefreshTokenStore::new(refresh_tokens),
            codec.clone(),
            SecretHasher::with_costs(8, 1, 1).unwrap(),
        );
        let state = AppState::new(auth, users, chirps.clone(), TEST_POLKA_KEY.to_string());

        TestSetup {
            router: router(state),
            chirps,
            codec,
        }
    }
}
