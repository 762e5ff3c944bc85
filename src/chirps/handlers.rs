use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::ChirpService,
    types::{ChirpResponse, CreateChirpRequest, ListChirpsQuery},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// HTTP handler for posting a chirp
///
/// POST /api/chirps (authenticated)
#[instrument(name = "create_chirp", skip(state, request))]
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), AppError> {
    let service = ChirpService::new(state.chirps.clone());
    let chirp = service.create_chirp(user.0, &request.body).await?;

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// HTTP handler for listing chirps
///
/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
#[instrument(name = "list_chirps", skip(state))]
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<Json<Vec<ChirpResponse>>, AppError> {
    let service = ChirpService::new(state.chirps.clone());
    let chirps = service
        .list_chirps(query.author_id.as_deref(), query.sort.as_deref())
        .await?;

    info!(chirp_count = chirps.len(), "Chirps listed");
    Ok(Json(chirps))
}

/// HTTP handler for fetching one chirp
///
/// GET /api/chirps/:chirp_id
#[instrument(name = "get_chirp", skip(state))]
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<ChirpResponse>, AppError> {
    let service = ChirpService::new(state.chirps.clone());
    Ok(Json(service.get_chirp(&chirp_id).await?))
}

/// HTTP handler for deleting one of the caller's chirps
///
/// DELETE /api/chirps/:chirp_id (authenticated)
#[instrument(name = "delete_chirp", skip(state))]
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = ChirpService::new(state.chirps.clone());
    service.delete_chirp(&chirp_id, user.0).await?;

    Ok(StatusCode::NO_CONTENT)
}
