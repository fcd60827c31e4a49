use serde::Deserialize;

use crate::adapter::{NmcliOptions, SimulatedNetwork};
use crate::presentation::Theme;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scan: ScanConfig,
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub permission: PermissionConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Browser origins allowed to call the API cross-origin. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the key-value store (remembered secrets).
    pub path: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

fn default_max_pool_size() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Substring the SSID filter matches on (case-sensitive).
    pub filter_substring: String,
    /// Filter switch position when the screen opens.
    #[serde(default = "default_filter_enabled")]
    pub filter_enabled: bool,
    /// Run permission + scan once at startup.
    #[serde(default = "default_scan_on_start")]
    pub scan_on_start: bool,
}

fn default_filter_enabled() -> bool {
    true
}

fn default_scan_on_start() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterBackend {
    Nmcli,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    pub backend: AdapterBackend,
    #[serde(default = "default_nmcli_path")]
    pub nmcli_path: String,
    #[serde(default)]
    pub interface: Option<String>,
    /// nmcli `--wait` seconds; 0 keeps nmcli's default.
    #[serde(default)]
    pub wait_secs: u64,
    #[serde(default = "default_rescan")]
    pub rescan: bool,
    /// Artificial latency for the simulated backend.
    #[serde(default)]
    pub simulated_latency_ms: u64,
    #[serde(default)]
    pub simulated: Vec<SimulatedNetwork>,
}

fn default_nmcli_path() -> String {
    "nmcli".into()
}

fn default_rescan() -> bool {
    true
}

impl AdapterConfig {
    pub fn nmcli_options(&self) -> NmcliOptions {
        NmcliOptions {
            program: self.nmcli_path.clone(),
            interface: self.interface.clone(),
            wait_secs: self.wait_secs,
            rescan: self.rescan,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Granted iff the adapter reports the Wi-Fi radio as enabled.
    #[default]
    Radio,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionConfig {
    #[serde(default)]
    pub mode: PermissionMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max session events buffered for /ws/state (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        for (i, origin) in self.server.allowed_origins.iter().enumerate() {
            anyhow::ensure!(
                is_origin(origin),
                "server.allowed_origins[{}] must be an http(s) origin without a path, got {:?}",
                i,
                origin
            );
        }
        anyhow::ensure!(
            !self.storage.path.is_empty(),
            "storage.path must be non-empty"
        );
        anyhow::ensure!(
            self.storage.max_pool_size > 0,
            "storage.max_pool_size must be > 0, got {}",
            self.storage.max_pool_size
        );
        anyhow::ensure!(
            !self.scan.filter_substring.is_empty(),
            "scan.filter_substring must be non-empty"
        );
        anyhow::ensure!(
            !self.adapter.nmcli_path.is_empty(),
            "adapter.nmcli_path must be non-empty"
        );
        if self.adapter.backend == AdapterBackend::Simulated {
            for (i, n) in self.adapter.simulated.iter().enumerate() {
                anyhow::ensure!(
                    !n.ssid.is_empty(),
                    "adapter.simulated[{}].ssid must be non-empty",
                    i
                );
            }
        }
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        for (name, value) in self.theme.colors() {
            anyhow::ensure!(
                is_hex_color(value),
                "theme.{} must be a #RRGGBB colour, got {:?}",
                name,
                value
            );
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// `scheme://host[:port]`, nothing after the authority.
fn is_origin(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(authority) => {
            !authority.is_empty()
                && !authority.contains(['/', '?', '#', ' '])
                && axum::http::HeaderValue::from_str(value).is_ok()
        }
        None => false,
    }
}
