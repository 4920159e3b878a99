use std::time::Duration;

use thiserror::Error;

/// Errors reported by an enclave client.
#[derive(Debug, Error)]
pub enum EnclaveError {
    #[error("not paired with an enclave")]
    NotPaired,

    #[error("pairing failed: {0}")]
    Pairing(String),

    #[error("enclave transport error: {0}")]
    Transport(String),

    #[error("enclave did not answer within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EnclaveResult<T> = Result<T, EnclaveError>;
