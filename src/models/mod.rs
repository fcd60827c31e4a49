// Domain models

mod network;
mod route;
mod state;

pub use network::{NetworkRecord, SECURED_MARKER, format_bssid};
pub use route::Screen;
pub use state::{OpenPrompt, PermissionStatus, ScanState, SecretRequest, row_key};
