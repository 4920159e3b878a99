//! Core types and traits shared by the signd control plane.

pub mod error;
pub mod protocol;
pub mod traits;

pub use error::{EnclaveError, EnclaveResult};
pub use protocol::{
    EnclaveRequest, EnclaveResponse, ListRequest, ListResponse, Me, MeRequest, MeResponse,
    PairingSecret, RequestBody, ResponseBody, SignRequest, SignResponse, UnrecognizedRequest,
};
pub use traits::{CommandContext, EnclaveClient};
