use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::{
    models::UserModel,
    types::{UserCredentialsRequest, UserResponse},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user
///
/// POST /api/users
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserCredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let digest = state.auth.hash_password(&request.password).await?;
    let user = UserModel::new(request.email, digest);
    state.users.create_user(&user).await?;

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// HTTP handler for changing the caller's email and password
///
/// PUT /api/users (authenticated)
#[instrument(name = "update_user", skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UserCredentialsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let digest = state.auth.hash_password(&request.password).await?;
    let updated = state
        .users
        .update_user(user.0, &request.email, &digest)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(user_id = %updated.id, "User updated");
    Ok(Json(updated.into()))
}
