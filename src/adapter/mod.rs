// Platform Wi-Fi adapter boundary. Scanning and association are owned by the platform.

mod nmcli;
mod simulated;

pub use nmcli::{NmcliAdapter, NmcliOptions, parse_scan_output, percent_to_dbm};
pub use simulated::{SimulatedAdapter, SimulatedNetwork};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::models::NetworkRecord;

/// One entry as returned by the adapter, before it becomes a [`NetworkRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetwork {
    pub ssid: String,
    pub bssid: String,
    pub level: i32,
    #[serde(default)]
    pub capabilities: Option<String>,
}

impl From<RawNetwork> for NetworkRecord {
    fn from(raw: RawNetwork) -> Self {
        NetworkRecord {
            ssid: raw.ssid,
            bssid: raw.bssid,
            signal_level: raw.level,
            security_info: raw.capabilities,
        }
    }
}

#[async_trait]
pub trait WifiAdapter: Send + Sync {
    /// Every network currently visible. May be empty.
    async fn scan(&self) -> Result<Vec<RawNetwork>, AdapterError>;

    async fn connect_open(&self, ssid: &str) -> Result<(), AdapterError>;

    async fn connect_secured(
        &self,
        ssid: &str,
        secret: &str,
        is_wep: bool,
        is_hidden: bool,
    ) -> Result<(), AdapterError>;

    /// Whether the radio can scan at all. Backs the radio permission broker.
    async fn radio_enabled(&self) -> Result<bool, AdapterError>;
}
