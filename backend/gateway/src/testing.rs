//! Scripted enclave client for handler tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use signd_core::{
    CommandContext, EnclaveClient, EnclaveError, EnclaveResult, ListRequest, ListResponse, Me,
    MeResponse, PairingSecret, SignRequest, SignResponse,
};

use crate::server::ControlState;

pub(crate) enum Script<T> {
    Answer(T),
    NoAnswer,
    Fail(String),
    Hang,
}

impl<T: Clone> Script<T> {
    async fn play(&self) -> EnclaveResult<Option<T>> {
        match self {
            Script::Answer(value) => Ok(Some(value.clone())),
            Script::NoAnswer => Ok(None),
            Script::Fail(reason) => Err(EnclaveError::Transport(reason.clone())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub(crate) struct ScriptedEnclave {
    pub cached: Mutex<Option<Me>>,
    pub me_fails: AtomicBool,
    pub pair_error: Mutex<Option<String>>,
    pub pair_calls: AtomicUsize,
    pub sign: Mutex<Script<SignResponse>>,
    pub list: Mutex<Script<ListResponse>>,
    pub signed: Mutex<Vec<SignRequest>>,
    pub listed: Mutex<Vec<ListRequest>>,
}

impl ScriptedEnclave {
    pub fn unpaired() -> Arc<Self> {
        Arc::new(Self {
            cached: Mutex::new(None),
            me_fails: AtomicBool::new(false),
            pair_error: Mutex::new(None),
            pair_calls: AtomicUsize::new(0),
            sign: Mutex::new(Script::NoAnswer),
            list: Mutex::new(Script::NoAnswer),
            signed: Mutex::new(Vec::new()),
            listed: Mutex::new(Vec::new()),
        })
    }

    pub fn paired() -> Arc<Self> {
        let enclave = Self::unpaired();
        *enclave.cached.lock().unwrap() = Some(sample_me());
        enclave
    }

    pub fn script_sign(&self, script: Script<SignResponse>) {
        *self.sign.lock().unwrap() = script;
    }

    pub fn script_list(&self, script: Script<ListResponse>) {
        *self.list.lock().unwrap() = script;
    }

    pub fn forwarded_signs(&self) -> Vec<SignRequest> {
        self.signed.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.signed.lock().unwrap().len() + self.listed.lock().unwrap().len()
    }
}

#[async_trait]
impl EnclaveClient for ScriptedEnclave {
    fn cached_me(&self) -> Option<Me> {
        self.cached.lock().unwrap().clone()
    }

    async fn pair(&self) -> EnclaveResult<PairingSecret> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.pair_error.lock().unwrap().clone() {
            return Err(EnclaveError::Pairing(reason));
        }
        *self.cached.lock().unwrap() = None;
        Ok(PairingSecret { secret: "5ec12e7".into(), workstation_name: Some("devbox".into()) })
    }

    async fn request_me(&self) -> EnclaveResult<Option<MeResponse>> {
        if self.me_fails.load(Ordering::SeqCst) {
            return Err(EnclaveError::Transport("bluetooth unavailable".into()));
        }
        Ok(self.cached_me().map(|me| MeResponse { me }))
    }

    async fn request_signature(&self, request: SignRequest) -> EnclaveResult<Option<SignResponse>> {
        self.signed.lock().unwrap().push(request);
        let script = std::mem::replace(&mut *self.sign.lock().unwrap(), Script::NoAnswer);
        let outcome = script.play().await;
        *self.sign.lock().unwrap() = script;
        outcome
    }

    async fn request_list(&self, request: ListRequest) -> EnclaveResult<Option<ListResponse>> {
        self.listed.lock().unwrap().push(request);
        let script = std::mem::replace(&mut *self.list.lock().unwrap(), Script::NoAnswer);
        let outcome = script.play().await;
        *self.list.lock().unwrap() = script;
        outcome
    }
}

pub(crate) struct FixedCommand(pub Option<String>);

impl CommandContext for FixedCommand {
    fn last_command(&self) -> Option<String> {
        self.0.clone()
    }
}

pub(crate) fn sample_me() -> Me {
    Me { email: "dev@example.com".into(), public_key_wire: "AAAAC3NzaC1lZDI1NTE5".into() }
}

pub(crate) fn control_state(enclave: &Arc<ScriptedEnclave>, last_command: Option<&str>) -> ControlState {
    ControlState::new(
        enclave.clone(),
        Arc::new(FixedCommand(last_command.map(str::to_string))),
    )
}
