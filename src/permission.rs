// Permission gate in front of scanning. Fails closed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::adapter::WifiAdapter;
use crate::error::PermissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    /// Required by the platform before a Wi-Fi scan may run.
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

#[async_trait]
pub trait PermissionBroker: Send + Sync {
    async fn request(&self, kind: PermissionKind) -> Result<PermissionOutcome, PermissionError>;
}

/// Broker with a fixed answer (kiosk builds, tests).
pub struct StaticPermission(pub PermissionOutcome);

#[async_trait]
impl PermissionBroker for StaticPermission {
    async fn request(&self, _kind: PermissionKind) -> Result<PermissionOutcome, PermissionError> {
        Ok(self.0)
    }
}

/// Grants location/scan permission when the adapter reports the radio as usable.
pub struct RadioPermission {
    adapter: Arc<dyn WifiAdapter>,
}

impl RadioPermission {
    pub fn new(adapter: Arc<dyn WifiAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl PermissionBroker for RadioPermission {
    async fn request(&self, kind: PermissionKind) -> Result<PermissionOutcome, PermissionError> {
        match kind {
            PermissionKind::Location => {
                if self.adapter.radio_enabled().await? {
                    Ok(PermissionOutcome::Granted)
                } else {
                    Ok(PermissionOutcome::Denied)
                }
            }
        }
    }
}

pub struct PermissionGate {
    broker: Arc<dyn PermissionBroker>,
}

impl PermissionGate {
    pub fn new(broker: Arc<dyn PermissionBroker>) -> Self {
        Self { broker }
    }

    /// `true` only on an explicit grant. Broker errors count as a denial.
    pub async fn request_location_permission(&self) -> bool {
        match self.broker.request(PermissionKind::Location).await {
            Ok(PermissionOutcome::Granted) => {
                tracing::debug!("location permission granted");
                true
            }
            Ok(PermissionOutcome::Denied) => {
                tracing::info!("location permission denied");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "permission request failed, treating as denied");
                false
            }
        }
    }
}
