//! In-memory enclave client.
//!
//! Holds the pairing secret, the cached identity and a mailbox between the
//! control server and whatever transport talks to the enclave. Requests the
//! enclave has not answered yet are queued in an outbox for the transport to
//! drain; answers the transport delivers are handed out on the next matching
//! request. Until then callers get `Ok(None)` and poll again.
//!
//! A request is queued at most once while it sits in the outbox. Once the
//! transport has drained it, the next poll queues it again, so a request lost
//! in transit is retried by the caller's own polling.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use signd_core::{
    EnclaveClient, EnclaveError, EnclaveResult, ListRequest, ListResponse, Me, MeResponse,
    PairingSecret, SignRequest, SignResponse,
};

use crate::pairing_secret::generate_secret;

const ME_KEY: &str = "me";

/// Requests waiting for the transport beyond this are dropped, oldest first.
pub const MAX_OUTBOX: usize = 256;

/// Delivered answers nobody has polled for beyond this are dropped, oldest first.
pub const MAX_UNCLAIMED_ANSWERS: usize = 256;

/// A request waiting to be carried to the enclave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outgoing {
    Me,
    Sign { key: String, request: SignRequest },
    List { key: String, request: ListRequest },
}

impl Outgoing {
    pub fn key(&self) -> &str {
        match self {
            Outgoing::Me => ME_KEY,
            Outgoing::Sign { key, .. } | Outgoing::List { key, .. } => key,
        }
    }
}

#[derive(Debug)]
enum Answer {
    Sign(SignResponse),
    List(ListResponse),
}

#[derive(Debug, Default)]
struct MailboxState {
    pairing: Option<PairingSecret>,
    me: Option<Me>,
    outbox: VecDeque<Outgoing>,
    answers: HashMap<String, Answer>,
    // unclaimed answer keys, oldest first
    answer_order: VecDeque<String>,
}

impl MailboxState {
    fn enqueue(&mut self, outgoing: Outgoing) {
        if self.outbox.iter().any(|queued| queued.key() == outgoing.key()) {
            return;
        }
        debug!(key = %outgoing.key(), "Queued request for enclave");
        self.outbox.push_back(outgoing);
        while self.outbox.len() > MAX_OUTBOX {
            if let Some(dropped) = self.outbox.pop_front() {
                warn!(key = %dropped.key(), "Outbox full, dropped oldest request");
            }
        }
    }

    fn store_answer(&mut self, key: String, answer: Answer) {
        self.answer_order.retain(|queued| *queued != key);
        self.answer_order.push_back(key.clone());
        self.answers.insert(key, answer);
        while self.answer_order.len() > MAX_UNCLAIMED_ANSWERS {
            if let Some(stale) = self.answer_order.pop_front() {
                self.answers.remove(&stale);
                warn!(key = %stale, "Dropped unclaimed enclave answer");
            }
        }
    }

    fn claim(&mut self, key: &str) -> Option<Answer> {
        let answer = self.answers.remove(key)?;
        self.answer_order.retain(|queued| queued != key);
        Some(answer)
    }
}

#[derive(Debug, Default)]
pub struct MailboxEnclave {
    workstation_name: Option<String>,
    state: Mutex<MailboxState>,
}

impl MailboxEnclave {
    pub fn new(workstation_name: Option<String>) -> Self {
        Self { workstation_name, state: Mutex::default() }
    }

    fn state(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The secret of the pairing in progress or completed, if any.
    pub fn pairing_secret(&self) -> Option<PairingSecret> {
        self.state().pairing.clone()
    }

    /// Record the identity the enclave presented, completing the current pairing.
    pub fn complete_pairing(&self, me: Me) -> EnclaveResult<()> {
        let mut state = self.state();
        if state.pairing.is_none() {
            warn!("Enclave identity arrived with no pairing in progress");
            return Err(EnclaveError::NotPaired);
        }
        info!(email = %me.email, "Pairing completed");
        state.outbox.retain(|queued| *queued != Outgoing::Me);
        state.me = Some(me);
        Ok(())
    }

    /// Drain requests that still have to be carried to the enclave.
    pub fn take_outbox(&self) -> Vec<Outgoing> {
        self.state().outbox.drain(..).collect()
    }

    /// Store the enclave's answer to `request` for the next matching poll.
    pub fn deliver_sign(&self, request: &SignRequest, response: SignResponse) {
        let key = sign_key(request);
        debug!(key = %key, "Signature answer delivered");
        self.state().store_answer(key, Answer::Sign(response));
    }

    pub fn deliver_list(&self, request: &ListRequest, response: ListResponse) {
        let key = list_key(request);
        debug!(key = %key, profiles = response.profiles.len(), "List answer delivered");
        self.state().store_answer(key, Answer::List(response));
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Requests are matched on content; the command is context only.
fn sign_key(request: &SignRequest) -> String {
    format!("sign:{}", digest(&[&request.public_key_fingerprint, &request.data]))
}

fn list_key(request: &ListRequest) -> String {
    format!("list:{}", digest(&[request.email_filter.as_deref().unwrap_or_default()]))
}

#[async_trait]
impl EnclaveClient for MailboxEnclave {
    fn cached_me(&self) -> Option<Me> {
        self.state().me.clone()
    }

    async fn pair(&self) -> EnclaveResult<PairingSecret> {
        let secret = generate_secret(self.workstation_name.as_deref());
        *self.state() = MailboxState { pairing: Some(secret.clone()), ..Default::default() };
        info!("New pairing started; previous pairing discarded");
        Ok(secret)
    }

    async fn request_me(&self) -> EnclaveResult<Option<MeResponse>> {
        let mut state = self.state();
        if let Some(me) = state.me.clone() {
            return Ok(Some(MeResponse { me }));
        }
        if state.pairing.is_none() {
            debug!("Identity requested before any pairing");
            return Ok(None);
        }
        state.enqueue(Outgoing::Me);
        Ok(None)
    }

    async fn request_signature(&self, request: SignRequest) -> EnclaveResult<Option<SignResponse>> {
        let mut state = self.state();
        if state.me.is_none() {
            return Err(EnclaveError::NotPaired);
        }
        let key = sign_key(&request);
        if let Some(Answer::Sign(answer)) = state.claim(&key) {
            return Ok(Some(answer));
        }
        state.enqueue(Outgoing::Sign { key, request });
        Ok(None)
    }

    async fn request_list(&self, request: ListRequest) -> EnclaveResult<Option<ListResponse>> {
        let mut state = self.state();
        if state.me.is_none() {
            return Err(EnclaveError::NotPaired);
        }
        let key = list_key(&request);
        if let Some(Answer::List(answer)) = state.claim(&key) {
            return Ok(Some(answer));
        }
        state.enqueue(Outgoing::List { key, request });
        Ok(None)
    }
}
