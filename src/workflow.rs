// Connection workflow: open vs protected, secret prompt, write-through credential memory.
//
// Idle -> AwaitingSecret -> { Idle (cancel / empty secret), Connecting -> { NavigatedAway, Idle+Error } }

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::instrument;

use crate::adapter::WifiAdapter;
use crate::error::ConnectionError;
use crate::models::{NetworkRecord, Screen, SecretRequest};
use crate::store::{CredentialMap, CredentialStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ConnectStep {
    /// Associated; the front end should navigate to `route`.
    #[serde(rename_all = "camelCase")]
    Connected {
        route: Screen,
        /// Set when the secret could not be remembered. Navigation still happens.
        persistence_warning: Option<String>,
    },
    /// Protected network: show the prompt and wait for submit or cancel.
    SecretRequired(SecretRequest),
    /// Nothing happened (prompt cancelled or empty secret).
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Cancel,
    Submit(String),
}

/// Secret entry for front ends that can block on the user (terminal, native dialog).
#[async_trait]
pub trait SecretPrompt: Send + Sync {
    async fn ask(&self, request: &SecretRequest) -> PromptOutcome;
}

pub struct ConnectionWorkflow {
    adapter: Arc<dyn WifiAdapter>,
    store: CredentialStore,
    remembered: RwLock<CredentialMap>,
    loaded: OnceCell<()>,
    pending: Mutex<Option<SecretRequest>>,
    next_token: AtomicU64,
}

impl ConnectionWorkflow {
    pub fn new(adapter: Arc<dyn WifiAdapter>, store: CredentialStore) -> Self {
        Self {
            adapter,
            store,
            remembered: RwLock::new(CredentialMap::new()),
            loaded: OnceCell::new(),
            pending: Mutex::new(None),
            next_token: AtomicU64::new(1),
        }
    }

    /// Seed the in-memory mapping from the store. The store is read at most once;
    /// anything that reads or writes remembered secrets waits for that read first.
    pub async fn load_credentials(&self) {
        self.loaded
            .get_or_init(|| async {
                let loaded = self.store.load().await;
                *self.remembered.write().await = loaded;
            })
            .await;
    }

    pub async fn remembered_secret(&self, ssid: &str) -> Option<String> {
        self.load_credentials().await;
        self.remembered.read().await.get(ssid).cloned()
    }

    pub async fn pending_prompt(&self) -> Option<SecretRequest> {
        self.pending.lock().await.clone()
    }

    /// Start connecting. Either way any prompt already open is closed: open networks
    /// associate immediately, protected ones open a fresh prompt.
    #[instrument(skip(self, network), fields(operation = "connect", ssid = %network.ssid, secured = network.is_secured()))]
    pub async fn connect(&self, network: &NetworkRecord) -> Result<ConnectStep, ConnectionError> {
        if !network.is_secured() {
            if let Some(dropped) = self.pending.lock().await.take() {
                tracing::debug!(token = dropped.token, "secret prompt superseded by open network");
            }
            return self.connect_open(&network.ssid).await;
        }
        let prefill = self.remembered_secret(&network.ssid).await;
        let request = SecretRequest {
            token: self.next_token.fetch_add(1, Ordering::Relaxed),
            ssid: network.ssid.clone(),
            prefill,
        };
        tracing::debug!(
            token = request.token,
            prefilled = request.prefill.is_some(),
            "secret prompt opened"
        );
        *self.pending.lock().await = Some(request.clone());
        Ok(ConnectStep::SecretRequired(request))
    }

    async fn connect_open(&self, ssid: &str) -> Result<ConnectStep, ConnectionError> {
        match self.adapter.connect_open(ssid).await {
            Ok(()) => {
                tracing::info!(ssid, "connected to open network");
                Ok(ConnectStep::Connected {
                    route: Screen::connection_success(ssid),
                    persistence_warning: None,
                })
            }
            Err(e) => {
                tracing::warn!(ssid, error = %e, "open network connection failed");
                Err(ConnectionError::OpenFailed(e))
            }
        }
    }

    /// Answer the prompt identified by `token`. An empty secret closes the prompt and does nothing else.
    #[instrument(skip(self, secret), fields(operation = "submit_secret", secret_len = secret.len()))]
    pub async fn submit_secret(
        &self,
        token: u64,
        secret: &str,
    ) -> Result<ConnectStep, ConnectionError> {
        let request = self.take_pending(token).await?;
        if secret.is_empty() {
            tracing::info!(ssid = %request.ssid, "no secret entered");
            return Ok(ConnectStep::Idle);
        }

        let ssid = request.ssid;
        if let Err(e) = self.adapter.connect_secured(&ssid, secret, false, false).await {
            tracing::warn!(ssid = %ssid, error = %e, "protected network connection failed");
            return Err(ConnectionError::SecuredFailed(e));
        }
        tracing::info!(ssid = %ssid, "connected to protected network");

        let persistence_warning = self.remember(&ssid, secret).await;
        Ok(ConnectStep::Connected {
            route: Screen::connection_success(ssid),
            persistence_warning,
        })
    }

    /// Close the prompt without doing anything. Returns whether `token` was the open prompt.
    pub async fn cancel(&self, token: u64) -> bool {
        let cancelled = self.take_pending(token).await.is_ok();
        if cancelled {
            tracing::info!(token, "connection cancelled by user");
        }
        cancelled
    }

    /// Whole decision in one call, asking `prompt` when a secret is needed.
    pub async fn connect_with_prompt(
        &self,
        network: &NetworkRecord,
        prompt: &dyn SecretPrompt,
    ) -> Result<ConnectStep, ConnectionError> {
        let request = match self.connect(network).await? {
            ConnectStep::SecretRequired(request) => request,
            other => return Ok(other),
        };
        match prompt.ask(&request).await {
            PromptOutcome::Cancel => {
                self.cancel(request.token).await;
                Ok(ConnectStep::Idle)
            }
            PromptOutcome::Submit(secret) => self.submit_secret(request.token, &secret).await,
        }
    }

    async fn take_pending(&self, token: u64) -> Result<SecretRequest, ConnectionError> {
        let mut pending = self.pending.lock().await;
        match pending.as_ref() {
            Some(request) if request.token == token => {
                pending.take().ok_or(ConnectionError::NoPendingPrompt)
            }
            _ => Err(ConnectionError::NoPendingPrompt),
        }
    }

    /// Write-through: the in-memory map only changes once the store accepted the update.
    async fn remember(&self, ssid: &str, secret: &str) -> Option<String> {
        self.load_credentials().await;
        let mut remembered = self.remembered.write().await;
        let mut updated = remembered.clone();
        updated.insert(ssid.to_string(), secret.to_string());
        match self.store.save(&updated).await {
            Ok(()) => {
                *remembered = updated;
                None
            }
            Err(e) => {
                tracing::warn!(ssid, error = %e, "could not remember secret");
                Some(e.to_string())
            }
        }
    }
}
