// Network scanner: adapter scan plus optional SSID substring filter.

use std::sync::Arc;
use tracing::instrument;

use crate::adapter::WifiAdapter;
use crate::error::ScanError;
use crate::models::NetworkRecord;

pub struct NetworkScanner {
    adapter: Arc<dyn WifiAdapter>,
}

impl NetworkScanner {
    pub fn new(adapter: Arc<dyn WifiAdapter>) -> Self {
        Self { adapter }
    }

    /// Fresh list on every call. An empty scan is an error, same as an adapter fault.
    /// A filter that matches nothing is not an error.
    #[instrument(skip(self), fields(operation = "scan"))]
    pub async fn scan(&self, filter: Option<&str>) -> Result<Vec<NetworkRecord>, ScanError> {
        let raw = self.adapter.scan().await.map_err(|e| {
            tracing::warn!(error = %e, "wifi scan failed");
            ScanError::Adapter(e)
        })?;
        if raw.is_empty() {
            tracing::info!("wifi scan returned no networks");
            return Err(ScanError::NoNetworks);
        }
        let records: Vec<NetworkRecord> = raw.into_iter().map(NetworkRecord::from).collect();
        let total = records.len();
        let records = match filter {
            Some(substring) => filter_by_ssid(records, substring),
            None => records,
        };
        tracing::info!(total, shown = records.len(), filter = ?filter, "wifi scan complete");
        Ok(records)
    }
}

/// Keep records whose SSID contains `substring` (case-sensitive), in order.
pub fn filter_by_ssid(records: Vec<NetworkRecord>, substring: &str) -> Vec<NetworkRecord> {
    records
        .into_iter()
        .filter(|r| r.ssid.contains(substring))
        .collect()
}
