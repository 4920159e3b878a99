//! Control HTTP server.
//!
//! Serves `/pair` and `/enclave` over a listener the caller has already bound.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use signd_core::{CommandContext, EnclaveClient, EnclaveError, EnclaveResult};

use crate::{enclave, pair};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared across routes.
#[derive(Clone)]
pub struct ControlState {
    pub enclave: Arc<dyn EnclaveClient>,
    pub commands: Arc<dyn CommandContext>,
    /// Upper bound on a single enclave client call made while serving a request.
    pub call_timeout: Duration,
}

impl ControlState {
    pub fn new(enclave: Arc<dyn EnclaveClient>, commands: Arc<dyn CommandContext>) -> Self {
        Self { enclave, commands, call_timeout: DEFAULT_CALL_TIMEOUT }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Runs one enclave client call, turning an elapsed deadline into [`EnclaveError::Timeout`].
    pub(crate) async fn bounded<T>(
        &self,
        call: impl Future<Output = EnclaveResult<T>>,
    ) -> EnclaveResult<T> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .unwrap_or_else(|_| Err(EnclaveError::Timeout(self.call_timeout)))
    }
}

/// Build the control router. Unlisted methods on `/pair` and `/enclave` get 405.
pub fn build_router(state: ControlState) -> Router {
    Router::new()
        .route("/pair", get(pair::get_pair).put(pair::put_pair))
        .route("/enclave", post(enclave::post_enclave))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the control API on `listener` until `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve<F>(listener: TcpListener, state: ControlState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, call_timeout_secs = state.call_timeout.as_secs(), "Control server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Control server stopped");
    Ok(())
}
