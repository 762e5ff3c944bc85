use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// Access-token middleware: verifies `Authorization: Bearer <jwt>` and adds
/// `AuthenticatedUser` to the request extensions.
/// Usage: `.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user))`
#[instrument(skip(state, req, next))]
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = match state.auth.authenticate(req.headers()).await {
        Ok(user_id) => user_id,
        Err(e) => {
            warn!(uri = %req.uri(), "Authentication failed: {}", e);
            return Err(e.into());
        }
    };

    debug!(user_id = %user_id, "Request authenticated");
    req.extensions_mut().insert(AuthenticatedUser(user_id));

    Ok(next.run(req).await)
}
