// Discovered wireless networks

use serde::{Deserialize, Serialize};

/// Capability marker that classifies a network as protected.
pub const SECURED_MARKER: &str = "WPA";

/// A network seen in one scan. Records are rebuilt on every scan; `bssid` is the
/// only thing used as a list key across renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub ssid: String,
    pub bssid: String,
    /// dBm as reported by the adapter (more negative = weaker).
    pub signal_level: i32,
    #[serde(default)]
    pub security_info: Option<String>,
}

impl NetworkRecord {
    pub fn new(
        ssid: impl Into<String>,
        bssid: impl Into<String>,
        signal_level: i32,
        security_info: Option<&str>,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
            signal_level,
            security_info: security_info.map(str::to_string),
        }
    }

    /// True iff the capability string mentions WPA. WEP-only networks count as open.
    pub fn is_secured(&self) -> bool {
        self.security_info
            .as_deref()
            .is_some_and(|caps| caps.contains(SECURED_MARKER))
    }

    pub fn display_bssid(&self) -> String {
        format_bssid(&self.bssid)
    }
}

/// Normalize a hardware address to `AA:BB:CC:DD:EE:FF`.
///
/// Existing `:`/`-` separators are dropped first. Anything that is not a non-empty,
/// even-length run of hex digits after that is returned unchanged.
pub fn format_bssid(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| *c != ':' && *c != '-').collect();
    if digits.is_empty()
        || digits.len() % 2 != 0
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return raw.to_string();
    }
    let upper = digits.to_ascii_uppercase();
    upper
        .as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .collect::<Vec<_>>()
        .join(":")
}
