//! `/pair` handlers: query pairing status and (re)start pairing.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use signd_core::{Me, PairingSecret};

use crate::server::ControlState;

/// Handler for `GET /pair`.
///
/// 200 with the enclave identity once pairing has completed, 404 otherwise.
/// A failing identity lookup is logged and still reported as 404.
pub async fn get_pair(State(state): State<ControlState>) -> Result<Json<Me>, StatusCode> {
    match state.bounded(state.enclave.request_me()).await {
        Ok(Some(response)) => Ok(Json(response.me)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(error = %e, "Identity lookup failed");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Handler for `PUT /pair`. Starts a new pairing, clearing any existing one.
///
/// On failure the reason is returned as the response body since the caller
/// has no other way to learn it.
pub async fn put_pair(
    State(state): State<ControlState>,
) -> Result<Json<PairingSecret>, (StatusCode, String)> {
    match state.bounded(state.enclave.pair()).await {
        Ok(secret) => {
            info!("Pairing initiated");
            Ok(Json(secret))
        }
        Err(e) => {
            error!(error = %e, "Failed to initiate pairing");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
