// Transient home-screen state and the secret prompt

use serde::{Deserialize, Serialize};

use super::NetworkRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionStatus {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// What the home screen shows. Replaced, never merged, by each scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    pub networks: Vec<NetworkRecord>,
    pub filter_enabled: bool,
    pub loading: bool,
    pub last_error: Option<String>,
    #[serde(default)]
    pub permission: PermissionStatus,
}

impl ScanState {
    pub fn new(filter_enabled: bool) -> Self {
        Self {
            filter_enabled,
            ..Self::default()
        }
    }

    /// State while a scan is in flight: list cleared, error cleared.
    pub fn begin_scan(&mut self) {
        self.loading = true;
        self.last_error = None;
        self.networks.clear();
    }

    pub fn finish_with(&mut self, networks: Vec<NetworkRecord>) {
        self.loading = false;
        self.last_error = None;
        self.networks = networks;
    }

    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.networks.clear();
        self.last_error = Some(message.into());
    }

    /// Resolve a list row key (see [`row_key`]) back to its record.
    pub fn find_by_key(&self, key: &str) -> Option<&NetworkRecord> {
        self.networks
            .iter()
            .enumerate()
            .find(|(i, n)| row_key(n, *i) == key)
            .map(|(_, n)| n)
    }
}

/// Stable list key: the BSSID, or `ssid#index` when the adapter reported none.
pub fn row_key(record: &NetworkRecord, index: usize) -> String {
    if record.bssid.is_empty() {
        format!("{}#{}", record.ssid, index)
    } else {
        record.bssid.clone()
    }
}

/// An open secret-entry prompt. `token` ties a submit/cancel to the prompt that was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRequest {
    pub token: u64,
    pub ssid: String,
    /// Remembered secret for this SSID, if any. Never logged.
    pub prefill: Option<String>,
}

impl SecretRequest {
    pub fn open_prompt(&self) -> OpenPrompt {
        OpenPrompt {
            token: self.token,
            ssid: self.ssid.clone(),
        }
    }
}

/// What shared state says about an open prompt. Carries no secret, so it is safe to
/// put in snapshots and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPrompt {
    pub token: u64,
    pub ssid: String,
}
