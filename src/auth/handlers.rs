use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use tracing::{info, instrument};

use super::types::{LoginRequest, LoginResponse, RefreshResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for logging in
///
/// POST /api/login
/// Returns the user plus an access token and a refresh token
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state
        .auth
        .login(&request.email, &request.password, request.expires_in_seconds)
        .await?;

    info!(user_id = %session.user.id, "User logged in");

    Ok(Json(LoginResponse {
        id: session.user.id,
        created_at: session.user.created_at,
        updated_at: session.user.updated_at,
        email: session.user.email,
        is_chirpy_red: session.user.is_chirpy_red,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// HTTP handler for exchanging a refresh token for a new access token
///
/// POST /api/refresh
#[instrument(name = "refresh", skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = state.auth.refresh(&headers).await?;
    Ok(Json(RefreshResponse { token }))
}

/// HTTP handler for revoking a refresh token
///
/// POST /api/revoke
#[instrument(name = "revoke", skip(state, headers))]
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&headers).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{seed_user, test_codec, AppStateBuilder};
    use axum::{
        body::Body,
        http::Request,
        routing::post,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/login", post(login))
            .route("/api/refresh", post(refresh))
            .route("/api/revoke", post(revoke))
            .with_state(state)
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/login")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"email": email, "password": password}).to_string(),
            ))
            .unwrap()
    }

    fn bearer_post(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_login_handler() {
        let state = AppStateBuilder::new().build();
        let user = seed_user(&state, "a@b.com", "secret123").await;

        let response = app(state)
            .oneshot(login_request("a@b.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let login: LoginResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(login.id, user.id);
        assert_eq!(login.email, "a@b.com");
        assert_eq!(test_codec().verify(&login.token).unwrap(), user.id);
        assert_eq!(login.refresh_token.len(), 64);
    }

    #[tokio::test]
    async fn test_login_handler_hides_failure_reason() {
        let state = AppStateBuilder::new().build();
        seed_user(&state, "a@b.com", "secret123").await;
        let app = app(state);

        let wrong_password = app
            .clone()
            .oneshot(login_request("a@b.com", "nope"))
            .await
            .unwrap();
        let unknown_user = app
            .oneshot(login_request("who@b.com", "secret123"))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
    }

    #[tokio::test]
    async fn test_refresh_and_revoke_handlers() {
        let state = AppStateBuilder::new().build();
        let user = seed_user(&state, "a@b.com", "secret123").await;
        let app = app(state);

        let response = app
            .clone()
            .oneshot(login_request("a@b.com", "secret123"))
            .await
            .unwrap();
        let login: LoginResponse = serde_json::from_value(body_json(response).await).unwrap();

        let response = app
            .clone()
            .oneshot(bearer_post("/api/refresh", &login.refresh_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let refreshed: RefreshResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(test_codec().verify(&refreshed.token).unwrap(), user.id);

        let response = app
            .clone()
            .oneshot(bearer_post("/api/revoke", &login.refresh_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(bearer_post("/api/refresh", &login.refresh_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token() {
        let state = AppStateBuilder::new().build();
        let response = app(state)
            .oneshot(bearer_post("/api/refresh", &"a".repeat(64)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
