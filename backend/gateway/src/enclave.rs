//! `/enclave` router: forwards identity, sign and list requests once paired.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use signd_core::{EnclaveRequest, EnclaveResponse, Me, RequestBody};

use crate::server::ControlState;

/// Handler for `POST /enclave`.
///
/// The pairing check runs before the body is decoded, so an unpaired caller
/// gets 404 whatever it sends.
pub async fn post_enclave(
    State(state): State<ControlState>,
    body: Bytes,
) -> Result<Json<EnclaveResponse>, StatusCode> {
    let Some(me) = state.enclave.cached_me() else {
        debug!("Rejecting enclave request: not paired");
        return Err(StatusCode::NOT_FOUND);
    };

    // Only the first JSON value counts; anything after it is ignored.
    let request = match serde_json::Deserializer::from_slice(&body).into_iter::<EnclaveRequest>().next() {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            debug!(error = %e, "Malformed enclave request");
            return Err(StatusCode::BAD_REQUEST);
        }
        None => {
            debug!("Empty enclave request");
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    dispatch(&state, me, request).await.map(Json)
}

async fn dispatch(
    state: &ControlState,
    me: Me,
    request: EnclaveRequest,
) -> Result<EnclaveResponse, StatusCode> {
    let EnclaveRequest { request_id, body } = request;

    match body {
        RequestBody::Me(_) => Ok(EnclaveResponse::me(me)),
        RequestBody::Sign(mut sign) => {
            if sign.command.is_none() {
                sign.command = state.commands.last_command();
            }
            let response = state
                .bounded(state.enclave.request_signature(sign))
                .await
                .map_err(|e| {
                    error!(error = %e, "Signature request error");
                    StatusCode::INTERNAL_SERVER_ERROR
                })?
                .ok_or(StatusCode::NOT_FOUND)?;
            Ok(EnclaveResponse::sign(request_id, response))
        }
        RequestBody::List(list) => {
            let response = state
                .bounded(state.enclave.request_list(list))
                .await
                .map_err(|e| {
                    error!(error = %e, "List request error");
                    StatusCode::INTERNAL_SERVER_ERROR
                })?
                .ok_or(StatusCode::NOT_FOUND)?;
            Ok(EnclaveResponse::list(request_id, response))
        }
    }
}
