use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::types::{WebhookEvent, WebhookRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for payment provider events
///
/// POST /api/polka/webhooks (Authorization: ApiKey <key>)
#[instrument(name = "polka_webhook", skip(state, headers, request))]
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<WebhookRequest>,
) -> Result<StatusCode, AppError> {
    state
        .auth
        .authenticate_service_key(&headers, &state.polka_key)?;

    let Some(event) = request.known_event() else {
        debug!(event = %request.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    };

    match event {
        WebhookEvent::UserUpgraded => {
            let user_id = Uuid::parse_str(&request.data.user_id)
                .map_err(|_| AppError::BadRequest("Couldn't parse user UUID".to_string()))?;

            if !state.users.upgrade_to_chirpy_red(user_id).await? {
                return Err(AppError::NotFound("User not found".to_string()));
            }

            info!(user_id = %user_id, "User upgraded to Chirpy Red");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
