// Remembered secrets, stored as one JSON object under a fixed key.
// Keyed by SSID: access points sharing a name share a secret.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::KeyValueStore;
use crate::error::PersistenceError;

pub const CREDENTIALS_KEY: &str = "savedPasswords";

/// SSID -> secret.
pub type CredentialMap = BTreeMap<String, String>;

#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Never fails: a missing, unreadable or malformed blob loads as an empty map.
    pub async fn load(&self) -> CredentialMap {
        let raw = match self.kv.get(CREDENTIALS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return CredentialMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved credentials");
                return CredentialMap::new();
            }
        };
        match serde_json::from_str::<CredentialMap>(&raw) {
            Ok(map) => {
                tracing::debug!(count = map.len(), "saved credentials loaded");
                map
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved credentials are malformed, ignoring");
                CredentialMap::new()
            }
        }
    }

    pub async fn save(&self, credentials: &CredentialMap) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(credentials)?;
        self.kv.set(CREDENTIALS_KEY, &json).await
    }
}
