use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{
    self,
    repository::{
        InMemoryRefreshTokenRepository, PostgresRefreshTokenRepository, RefreshTokenRepository,
    },
    AccessTokenCodec, AuthService, RefreshTokenStore, SecretHasher,
};
use crate::chirps::{
    self,
    repository::{ChirpRepository, InMemoryChirpRepository, PostgresChirpRepository},
};
use crate::config::AppConfig;
use crate::shared::AppState;
use crate::users::{
    self,
    repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
};
use crate::webhooks;

/// Wires repositories and the authentication service from configuration.
///
/// PostgreSQL is used when a pool is given, in-memory stores otherwise.
pub fn build_state(config: &AppConfig, pool: Option<PgPool>, hasher: SecretHasher) -> AppState {
    let (users, refresh_tokens, chirps): (
        Arc<dyn UserRepository + Send + Sync>,
        Arc<dyn RefreshTokenRepository + Send + Sync>,
        Arc<dyn ChirpRepository + Send + Sync>,
    ) = match pool {
        Some(pool) => (
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
            Arc::new(PostgresChirpRepository::new(pool)),
        ),
        None => (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryRefreshTokenRepository::new()),
            Arc::new(InMemoryChirpRepository::new()),
        ),
    };

    let auth = AuthService::new(
        users.clone(),
        RefreshTokenStore::new(refresh_tokens),
        AccessTokenCodec::new(config.jwt_secret.clone()),
        hasher,
    );

    AppState::new(auth, users, chirps, config.polka_key.clone())
}

/// Builds the HTTP router
pub fn router(state: AppState) -> Router {
    let require_user = middleware::from_fn_with_state(state.clone(), auth::require_user);

    Router::new()
        .route("/api/healthz", get(|| async { "OK" }))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route(
            "/api/users",
            post(users::create_user)
                .merge(axum::routing::put(users::update_user).route_layer(require_user.clone())),
        )
        .route(
            "/api/chirps",
            get(chirps::list_chirps)
                .merge(post(chirps::create_chirp).route_layer(require_user.clone())),
        )
        .route(
            "/api/chirps/:chirp_id",
            get(chirps::get_chirp)
                .merge(axum::routing::delete(chirps::delete_chirp).route_layer(require_user)),
        )
        .route("/api/polka/webhooks", post(webhooks::polka_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
