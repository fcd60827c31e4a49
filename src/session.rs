// Home-screen session: owns ScanState and the current screen, drives permission -> scan,
// forwards user actions to the connection workflow and publishes every change.
//
// Overlapping scans are cancel-and-replace: each scan takes a generation and a result
// is applied only if its generation is still the latest. Connection attempts are
// serialized instead, so the screen always ends on the attempt that was started last.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::adapter::WifiAdapter;
use crate::error::{ConnectionError, PERMISSION_DENIED_MESSAGE};
use crate::models::{OpenPrompt, PermissionStatus, ScanState, Screen};
use crate::permission::{PermissionBroker, PermissionGate};
use crate::scanner::NetworkScanner;
use crate::store::CredentialStore;
use crate::workflow::{ConnectStep, ConnectionWorkflow};

/// Everything a front end needs to render the current screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub screen: Screen,
    pub scan: ScanState,
    pub prompt: Option<OpenPrompt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Snapshot(SessionSnapshot),
    /// One-shot, dismissible notification. Not kept in state.
    Alert { title: String, message: String },
}

pub struct SessionDeps {
    pub adapter: Arc<dyn WifiAdapter>,
    pub permissions: Arc<dyn PermissionBroker>,
    pub credentials: CredentialStore,
    pub events: broadcast::Sender<SessionEvent>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub filter_substring: String,
    pub filter_enabled: bool,
}

pub struct HomeSession {
    gate: PermissionGate,
    scanner: NetworkScanner,
    workflow: ConnectionWorkflow,
    filter_substring: String,
    state: RwLock<ScanState>,
    screen: RwLock<Screen>,
    scan_generation: AtomicU64,
    connect_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl HomeSession {
    pub fn new(deps: SessionDeps, config: SessionConfig) -> Self {
        let SessionDeps {
            adapter,
            permissions,
            credentials,
            events,
        } = deps;
        Self {
            gate: PermissionGate::new(permissions),
            scanner: NetworkScanner::new(adapter.clone()),
            workflow: ConnectionWorkflow::new(adapter, credentials),
            filter_substring: config.filter_substring,
            state: RwLock::new(ScanState::new(config.filter_enabled)),
            screen: RwLock::new(Screen::Home),
            scan_generation: AtomicU64::new(0),
            connect_lock: Mutex::new(()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn filter_substring(&self) -> &str {
        &self.filter_substring
    }

    /// Load remembered secrets, then ask for permission and scan.
    pub async fn start(&self) -> ScanState {
        self.workflow.load_credentials().await;
        self.refresh().await
    }

    pub async fn scan_state(&self) -> ScanState {
        self.state.read().await.clone()
    }

    pub async fn screen(&self) -> Screen {
        self.screen.read().await.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            screen: self.screen().await,
            scan: self.scan_state().await,
            prompt: self
                .workflow
                .pending_prompt()
                .await
                .map(|request| request.open_prompt()),
        }
    }

    /// Permission gate, then a fresh scan with the current filter setting.
    /// Returns the state as it stands when this call finishes.
    pub async fn refresh(&self) -> ScanState {
        let generation = self.scan_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let filter_enabled = {
            let mut state = self.state.write().await;
            state.begin_scan();
            state.filter_enabled
        };
        self.publish_snapshot().await;

        if !self.gate.request_location_permission().await {
            if self.is_current(generation) {
                {
                    let mut state = self.state.write().await;
                    state.permission = PermissionStatus::Denied;
                    state.fail_with(PERMISSION_DENIED_MESSAGE);
                }
                self.alert(
                    "Permission denied",
                    "Wi-Fi networks cannot be scanned without location permission.",
                );
                self.publish_snapshot().await;
            }
            return self.scan_state().await;
        }

        let filter = filter_enabled.then_some(self.filter_substring.as_str());
        let result = self.scanner.scan(filter).await;

        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding superseded scan result");
            return self.scan_state().await;
        }
        {
            let mut state = self.state.write().await;
            state.permission = PermissionStatus::Granted;
            match result {
                Ok(networks) => state.finish_with(networks),
                Err(e) => state.fail_with(e.user_message()),
            }
        }
        self.publish_snapshot().await;
        self.scan_state().await
    }

    /// Toggle the SSID filter and rescan with the new setting.
    pub async fn set_filter(&self, enabled: bool) -> ScanState {
        self.state.write().await.filter_enabled = enabled;
        tracing::info!(enabled, substring = %self.filter_substring, "filter toggled");
        self.refresh().await
    }

    /// Start connecting to the network behind a list row key.
    pub async fn connect(&self, key: &str) -> Result<ConnectStep, ConnectionError> {
        let network = self
            .state
            .read()
            .await
            .find_by_key(key)
            .cloned()
            .ok_or_else(|| ConnectionError::UnknownNetwork(key.to_string()))?;
        let _serial = self.connect_lock.lock().await;
        let result = self.workflow.connect(&network).await;
        self.apply_step(result).await
    }

    pub async fn submit_secret(
        &self,
        token: u64,
        secret: &str,
    ) -> Result<ConnectStep, ConnectionError> {
        let _serial = self.connect_lock.lock().await;
        let result = self.workflow.submit_secret(token, secret).await;
        self.apply_step(result).await
    }

    pub async fn cancel_secret(&self, token: u64) -> bool {
        let cancelled = self.workflow.cancel(token).await;
        if cancelled {
            self.publish_snapshot().await;
        }
        cancelled
    }

    /// Leave the confirmation screen.
    pub async fn back_to_home(&self) {
        *self.screen.write().await = Screen::Home;
        self.publish_snapshot().await;
    }

    pub fn workflow(&self) -> &ConnectionWorkflow {
        &self.workflow
    }

    async fn apply_step(
        &self,
        result: Result<ConnectStep, ConnectionError>,
    ) -> Result<ConnectStep, ConnectionError> {
        match &result {
            Ok(ConnectStep::Connected {
                route,
                persistence_warning,
            }) => {
                *self.screen.write().await = route.clone();
                if let Some(warning) = persistence_warning {
                    self.alert("Password not saved", warning);
                }
            }
            Ok(_) => {}
            Err(ConnectionError::NoPendingPrompt) | Err(ConnectionError::UnknownNetwork(_)) => {}
            Err(e) => self.alert("Error", &e.to_string()),
        }
        self.publish_snapshot().await;
        result
    }

    fn is_current(&self, generation: u64) -> bool {
        self.scan_generation.load(Ordering::SeqCst) == generation
    }

    fn alert(&self, title: &str, message: &str) {
        // No subscribers is fine; the HTTP caller still gets the error.
        let _ = self.events.send(SessionEvent::Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    async fn publish_snapshot(&self) {
        let snapshot = self.snapshot().await;
        let _ = self.events.send(SessionEvent::Snapshot(snapshot));
    }
}
