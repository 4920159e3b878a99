use async_trait::async_trait;

use crate::error::EnclaveResult;
use crate::protocol::{ListRequest, ListResponse, Me, MeResponse, PairingSecret, SignRequest, SignResponse};

/// Capability set the control server needs from the enclave side.
///
/// Implementations own pairing state, the cached identity, and every
/// transport, retry and queueing concern. `Ok(None)` from a request method
/// means the enclave has not answered yet; callers are expected to poll.
#[async_trait]
pub trait EnclaveClient: Send + Sync + 'static {
    /// The identity cached by the last successful pairing, if any.
    fn cached_me(&self) -> Option<Me>;

    /// Start a new pairing, discarding any existing one.
    async fn pair(&self) -> EnclaveResult<PairingSecret>;

    /// Ask the enclave for its identity.
    async fn request_me(&self) -> EnclaveResult<Option<MeResponse>>;

    async fn request_signature(&self, request: SignRequest) -> EnclaveResult<Option<SignResponse>>;

    async fn request_list(&self, request: ListRequest) -> EnclaveResult<Option<ListResponse>>;
}

/// Source of the most recently observed external command (e.g. from a shell hook).
pub trait CommandContext: Send + Sync + 'static {
    fn last_command(&self) -> Option<String>;
}
