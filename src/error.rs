// Error taxonomy. Every variant ends the current user action; nothing retries.

use thiserror::Error;

/// User-visible text for a failed or empty scan.
pub const NO_NETWORKS_MESSAGE: &str = "no networks found";
pub const PERMISSION_DENIED_MESSAGE: &str = "location permission denied";

/// Fault reported by the platform Wi-Fi adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("association with {ssid} rejected")]
    Rejected { ssid: String },
    #[error("unexpected adapter output: {0}")]
    Output(String),
}

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("permission broker unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// An empty scan and an adapter fault look the same to the user.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no networks found")]
    NoNetworks,
    #[error("no networks found")]
    Adapter(#[source] AdapterError),
}

impl ScanError {
    pub fn user_message(&self) -> &'static str {
        NO_NETWORKS_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Open network association failed.
    #[error("could not connect to the network")]
    OpenFailed(#[source] AdapterError),
    /// Protected network association failed (wrong secret, out of range, busy...).
    #[error("could not connect to the network, verify your password")]
    SecuredFailed(#[source] AdapterError),
    #[error("no secret prompt is open for this request")]
    NoPendingPrompt,
    #[error("network {0} is not in the current scan results")]
    UnknownNetwork(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("key-value store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("credential encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),
}
