//! Request and response shapes exchanged with local callers and the enclave.
//!
//! On the wire a request is a JSON object with optional `me_request`,
//! `sign_request` and `list_request` members plus an optional `request_id`.
//! It is decoded into [`EnclaveRequest`], which carries exactly one
//! [`RequestBody`]. When several members are present, Me wins over Sign and
//! Sign wins over List.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The enclave's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    pub email: String,
    pub public_key_wire: String,
}

/// Token handed to the caller when pairing starts. Opaque to the control server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSecret {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workstation_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub me: Me,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub public_key_fingerprint: String,
    #[serde(default)]
    pub data: String,
    /// Command that triggered the signature, shown to the user on the enclave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub profiles: Vec<Me>,
}

/// The single operation an [`EnclaveRequest`] asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Me(MeRequest),
    Sign(SignRequest),
    List(ListRequest),
}

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRequest", into = "WireRequest")]
pub struct EnclaveRequest {
    /// Caller-supplied correlation token, echoed back on sign and list responses.
    pub request_id: Option<String>,
    pub body: RequestBody,
}

impl EnclaveRequest {
    pub fn new(body: RequestBody) -> Self {
        Self { request_id: None, body }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Returned when a request object carries none of the known operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request carries no me_request, sign_request or list_request")]
pub struct UnrecognizedRequest;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    me_request: Option<MeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sign_request: Option<SignRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_request: Option<ListRequest>,
}

impl TryFrom<WireRequest> for EnclaveRequest {
    type Error = UnrecognizedRequest;

    fn try_from(wire: WireRequest) -> Result<Self, Self::Error> {
        let body = if let Some(me) = wire.me_request {
            RequestBody::Me(me)
        } else if let Some(sign) = wire.sign_request {
            RequestBody::Sign(sign)
        } else if let Some(list) = wire.list_request {
            RequestBody::List(list)
        } else {
            return Err(UnrecognizedRequest);
        };
        Ok(Self { request_id: wire.request_id, body })
    }
}

impl From<EnclaveRequest> for WireRequest {
    fn from(request: EnclaveRequest) -> Self {
        let mut wire = WireRequest { request_id: request.request_id, ..Default::default() };
        match request.body {
            RequestBody::Me(me) => wire.me_request = Some(me),
            RequestBody::Sign(sign) => wire.sign_request = Some(sign),
            RequestBody::List(list) => wire.list_request = Some(list),
        }
        wire
    }
}

/// The single answer carried by an [`EnclaveResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseBody {
    MeResponse(MeResponse),
    SignResponse(SignResponse),
    ListResponse(ListResponse),
}

/// An outbound response, serialized flat as `{"request_id": ..., "<kind>_response": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl EnclaveResponse {
    /// Identity responses come straight from the pairing cache and carry no request id.
    pub fn me(me: Me) -> Self {
        Self { request_id: None, body: ResponseBody::MeResponse(MeResponse { me }) }
    }

    pub fn sign(request_id: Option<String>, response: SignResponse) -> Self {
        Self { request_id, body: ResponseBody::SignResponse(response) }
    }

    pub fn list(request_id: Option<String>, response: ListResponse) -> Self {
        Self { request_id, body: ResponseBody::ListResponse(response) }
    }
}
