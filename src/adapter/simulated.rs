// In-memory adapter for demos and hosts without NetworkManager.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

use super::{RawNetwork, WifiAdapter};
use crate::error::AdapterError;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedNetwork {
    pub ssid: String,
    pub bssid: String,
    pub level: i32,
    #[serde(default)]
    pub capabilities: Option<String>,
    /// Secret the simulated access point accepts. Ignored for open networks.
    #[serde(default)]
    pub secret: Option<String>,
}

pub struct SimulatedAdapter {
    networks: Vec<SimulatedNetwork>,
    latency: Duration,
    scan_count: AtomicUsize,
}

impl SimulatedAdapter {
    pub fn new(networks: Vec<SimulatedNetwork>, latency_ms: u64) -> Self {
        Self {
            networks,
            latency: Duration::from_millis(latency_ms),
            scan_count: AtomicUsize::new(0),
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scan_count.load(Ordering::Relaxed)
    }

    fn find(&self, ssid: &str) -> Option<&SimulatedNetwork> {
        self.networks.iter().find(|n| n.ssid == ssid)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl WifiAdapter for SimulatedAdapter {
    async fn scan(&self) -> Result<Vec<RawNetwork>, AdapterError> {
        self.delay().await;
        let n = self.scan_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(scan = n, "simulated scan");
        Ok(self
            .networks
            .iter()
            .map(|n| RawNetwork {
                ssid: n.ssid.clone(),
                bssid: n.bssid.clone(),
                level: n.level,
                capabilities: n.capabilities.clone(),
            })
            .collect())
    }

    async fn connect_open(&self, ssid: &str) -> Result<(), AdapterError> {
        self.delay().await;
        match self.find(ssid) {
            Some(_) => Ok(()),
            None => Err(AdapterError::Rejected { ssid: ssid.into() }),
        }
    }

    async fn connect_secured(
        &self,
        ssid: &str,
        secret: &str,
        is_wep: bool,
        is_hidden: bool,
    ) -> Result<(), AdapterError> {
        self.delay().await;
        let accepted = !is_wep
            && !is_hidden
            && self
                .find(ssid)
                .and_then(|n| n.secret.as_deref())
                .is_some_and(|expected| expected == secret);
        if accepted {
            Ok(())
        } else {
            Err(AdapterError::Rejected { ssid: ssid.into() })
        }
    }

    async fn radio_enabled(&self) -> Result<bool, AdapterError> {
        Ok(true)
    }
}
