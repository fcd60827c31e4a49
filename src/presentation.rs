// View models for the two screens. No decisions are made here; everything is derived
// from the session snapshot and the theme handed down from main.

use serde::{Deserialize, Serialize};

use crate::error::NO_NETWORKS_MESSAGE;
use crate::models::{NetworkRecord, OpenPrompt, ScanState, Screen, row_key};
use crate::session::SessionSnapshot;

/// Colour palette. Built once from config and passed to whoever renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_error")]
    pub error: String,
    #[serde(default = "default_success")]
    pub success: String,
}

fn default_primary() -> String {
    "#6200EE".into()
}
fn default_secondary() -> String {
    "#03DAC6".into()
}
fn default_background() -> String {
    "#FFFFFF".into()
}
fn default_text() -> String {
    "#000000".into()
}
fn default_error() -> String {
    "#B00020".into()
}
fn default_success() -> String {
    "#4CAF50".into()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            background: default_background(),
            text: default_text(),
            error: default_error(),
            success: default_success(),
        }
    }
}

impl Theme {
    /// Every colour as `(name, value)`, for validation.
    pub fn colors(&self) -> [(&'static str, &str); 6] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("background", self.background.as_str()),
            ("text", self.text.as_str()),
            ("error", self.error.as_str()),
            ("success", self.success.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRow {
    pub key: String,
    pub title: String,
    pub mac: String,
    pub signal: String,
    /// Only present when the adapter reported security info.
    pub protected: Option<bool>,
}

impl NetworkRow {
    pub fn from_record(record: &NetworkRecord, index: usize) -> Self {
        Self {
            key: row_key(record, index),
            title: record.ssid.clone(),
            mac: record.display_bssid(),
            signal: format!("{} dBm", record.signal_level),
            protected: record.security_info.as_ref().map(|_| record.is_secured()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HomeView {
    Loading,
    Error { message: String },
    Empty { message: String },
    List { rows: Vec<NetworkRow> },
}

impl HomeView {
    /// Loading wins over error, error over empty.
    pub fn from_state(state: &ScanState) -> Self {
        if state.loading {
            return HomeView::Loading;
        }
        if let Some(message) = &state.last_error {
            return HomeView::Error {
                message: message.clone(),
            };
        }
        if state.networks.is_empty() {
            return HomeView::Empty {
                message: NO_NETWORKS_MESSAGE.to_string(),
            };
        }
        HomeView::List {
            rows: state
                .networks
                .iter()
                .enumerate()
                .map(|(i, n)| NetworkRow::from_record(n, i))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterView {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessView {
    pub heading: String,
    pub message: String,
    pub ssid: String,
}

impl SuccessView {
    pub fn new(ssid: &str) -> Self {
        Self {
            heading: "Connected!".into(),
            message: "You are now connected to the Wi-Fi network.".into(),
            ssid: ssid.to_string(),
        }
    }
}

/// Full render model sent over HTTP and WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppView {
    pub screen: Screen,
    pub home: HomeView,
    pub filter: FilterView,
    pub prompt: Option<PromptView>,
    pub success: Option<SuccessView>,
}

/// Secret prompt as shown to the user. The remembered secret is not part of it; only
/// the connect response that opened the prompt carries the prefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptView {
    pub token: u64,
    pub title: String,
    pub message: String,
}

impl PromptView {
    pub fn new(prompt: &OpenPrompt) -> Self {
        Self {
            token: prompt.token,
            title: "Password required".into(),
            message: format!("Enter the password for network: {}", prompt.ssid),
        }
    }
}

impl AppView {
    pub fn from_snapshot(snapshot: &SessionSnapshot, filter_substring: &str) -> Self {
        let success = match &snapshot.screen {
            Screen::ConnectionSuccess { ssid } => Some(SuccessView::new(ssid)),
            Screen::Home => None,
        };
        Self {
            screen: snapshot.screen.clone(),
            home: HomeView::from_state(&snapshot.scan),
            filter: FilterView {
                label: format!("Filter by \"{}\"", filter_substring),
                enabled: snapshot.scan.filter_enabled,
            },
            prompt: snapshot.prompt.as_ref().map(PromptView::new),
            success,
        }
    }
}
