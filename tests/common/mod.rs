// Shared test helpers: scripted adapter, in-memory key-value store, session builder
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use wifi_scanner::adapter::{RawNetwork, WifiAdapter};
use wifi_scanner::error::{AdapterError, PersistenceError};
use wifi_scanner::permission::{PermissionOutcome, StaticPermission};
use wifi_scanner::session::{HomeSession, SessionConfig, SessionDeps, SessionEvent};
use wifi_scanner::store::{CredentialStore, KeyValueStore};

pub fn raw(ssid: &str, bssid: &str, level: i32, capabilities: Option<&str>) -> RawNetwork {
    RawNetwork {
        ssid: ssid.into(),
        bssid: bssid.into(),
        level,
        capabilities: capabilities.map(str::to_string),
    }
}

pub fn raspberry_ap() -> RawNetwork {
    raw("RaspberryAP", "aabbccddeeff", -40, Some("WPA2"))
}

pub fn open_cafe() -> RawNetwork {
    raw("CafeOpen", "112233445566", -70, None)
}

struct ScriptedScan {
    delay_ms: u64,
    result: Result<Vec<RawNetwork>, String>,
}

/// Adapter whose scans and connection outcomes are set up by the test.
pub struct FakeAdapter {
    default_networks: Vec<RawNetwork>,
    scripted: Mutex<VecDeque<ScriptedScan>>,
    accepted_secret: Option<String>,
    open_fails: bool,
    radio_enabled: bool,
    open_delays: HashMap<String, u64>,
    pub scan_calls: AtomicUsize,
    pub open_calls: AtomicUsize,
    pub secured_calls: Mutex<Vec<(String, String, bool, bool)>>,
}

impl FakeAdapter {
    pub fn new(networks: Vec<RawNetwork>) -> Self {
        Self {
            default_networks: networks,
            scripted: Mutex::new(VecDeque::new()),
            accepted_secret: None,
            open_fails: false,
            radio_enabled: true,
            open_delays: HashMap::new(),
            scan_calls: AtomicUsize::new(0),
            open_calls: AtomicUsize::new(0),
            secured_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting(mut self, secret: &str) -> Self {
        self.accepted_secret = Some(secret.into());
        self
    }

    pub fn with_open_failure(mut self) -> Self {
        self.open_fails = true;
        self
    }

    /// Association with `ssid` takes `delay_ms` before succeeding.
    pub fn with_open_delay(mut self, ssid: &str, delay_ms: u64) -> Self {
        self.open_delays.insert(ssid.into(), delay_ms);
        self
    }

    pub fn with_radio_disabled(mut self) -> Self {
        self.radio_enabled = false;
        self
    }

    /// Next scan (in FIFO order) waits `delay_ms` and returns `networks`.
    pub fn push_scan(&self, delay_ms: u64, networks: Vec<RawNetwork>) {
        self.scripted.lock().unwrap().push_back(ScriptedScan {
            delay_ms,
            result: Ok(networks),
        });
    }

    pub fn push_scan_error(&self, message: &str) {
        self.scripted.lock().unwrap().push_back(ScriptedScan {
            delay_ms: 0,
            result: Err(message.into()),
        });
    }

    pub fn scans(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn secured_attempts(&self) -> Vec<(String, String, bool, bool)> {
        self.secured_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WifiAdapter for FakeAdapter {
    async fn scan(&self) -> Result<Vec<RawNetwork>, AdapterError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(script) => {
                if script.delay_ms > 0 {
                    tokio::time::sleep(tokio::time::Duration::from_millis(script.delay_ms)).await;
                }
                script.result.map_err(AdapterError::Output)
            }
            None => Ok(self.default_networks.clone()),
        }
    }

    async fn connect_open(&self, ssid: &str) -> Result<(), AdapterError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay_ms) = self.open_delays.get(ssid) {
            tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
        }
        if self.open_fails {
            Err(AdapterError::Rejected { ssid: ssid.into() })
        } else {
            Ok(())
        }
    }

    async fn connect_secured(
        &self,
        ssid: &str,
        secret: &str,
        is_wep: bool,
        is_hidden: bool,
    ) -> Result<(), AdapterError> {
        self.secured_calls.lock().unwrap().push((
            ssid.into(),
            secret.into(),
            is_wep,
            is_hidden,
        ));
        if self.accepted_secret.as_deref() == Some(secret) {
            Ok(())
        } else {
            Err(AdapterError::Rejected { ssid: ssid.into() })
        }
    }

    async fn radio_enabled(&self) -> Result<bool, AdapterError> {
        Ok(self.radio_enabled)
    }
}

/// In-memory blob store that counts reads and writes and can refuse writes.
#[derive(Default)]
pub struct MemoryKvStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: bool,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.into(), value.into());
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn accesses(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(PersistenceError::Unavailable("disk full".into()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.into(), value.into());
        Ok(())
    }
}

pub struct TestSession {
    pub session: Arc<HomeSession>,
    pub adapter: Arc<FakeAdapter>,
    pub kv: Arc<MemoryKvStore>,
    pub events: broadcast::Sender<SessionEvent>,
}

pub fn session_with(
    adapter: FakeAdapter,
    kv: MemoryKvStore,
    permission: PermissionOutcome,
    filter_enabled: bool,
) -> TestSession {
    let adapter = Arc::new(adapter);
    let kv = Arc::new(kv);
    let (events, _) = broadcast::channel(64);
    let session = Arc::new(HomeSession::new(
        SessionDeps {
            adapter: adapter.clone(),
            permissions: Arc::new(StaticPermission(permission)),
            credentials: CredentialStore::new(kv.clone()),
            events: events.clone(),
        },
        SessionConfig {
            filter_substring: "RaspberryAP".into(),
            filter_enabled,
        },
    ));
    TestSession {
        session,
        adapter,
        kv,
        events,
    }
}
