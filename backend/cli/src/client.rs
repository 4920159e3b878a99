//! HTTP client for a running control server, used by the CLI subcommands.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;

use signd_core::{
    EnclaveRequest, EnclaveResponse, ListRequest, ListResponse, Me, PairingSecret, RequestBody,
    ResponseBody,
};

pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    /// `PUT /pair`: start a new pairing.
    pub async fn pair(&self) -> Result<PairingSecret> {
        let resp = self
            .http
            .put(format!("{}/pair", self.base_url))
            .send()
            .await
            .context("control server unreachable")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let reason = resp.text().await.unwrap_or_default();
            bail!("pairing failed ({status}): {reason}");
        }
        Ok(resp.json().await?)
    }

    /// `GET /pair`: the enclave identity, `None` while unpaired.
    pub async fn me(&self) -> Result<Option<Me>> {
        let resp = self
            .http
            .get(format!("{}/pair", self.base_url))
            .send()
            .await
            .context("control server unreachable")?;
        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => bail!("unexpected status {status}"),
        }
    }

    /// `POST /enclave` with a list request. `None` when unpaired or not answered yet.
    pub async fn list(&self, email_filter: Option<String>) -> Result<Option<ListResponse>> {
        let request = EnclaveRequest::new(RequestBody::List(ListRequest { email_filter }));
        let resp = self
            .http
            .post(format!("{}/enclave", self.base_url))
            .json(&request)
            .send()
            .await
            .context("control server unreachable")?;
        match resp.status() {
            StatusCode::OK => {
                let response: EnclaveResponse = resp.json().await?;
                match response.body {
                    ResponseBody::ListResponse(list) => Ok(Some(list)),
                    other => bail!("unexpected enclave response: {other:?}"),
                }
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => bail!("list request failed with status {status}"),
        }
    }
}
