// NetworkManager adapter via the nmcli CLI (terse, escaped output).

use async_trait::async_trait;
use tokio::process::Command;
use tracing::instrument;

use super::{RawNetwork, WifiAdapter};
use crate::error::AdapterError;

const SCAN_FIELDS: &str = "SSID,BSSID,SIGNAL,SECURITY";

#[derive(Debug, Clone)]
pub struct NmcliOptions {
    pub program: String,
    /// Restrict to one wireless device; `None` lets NetworkManager pick.
    pub interface: Option<String>,
    /// Passed as `--wait`; 0 keeps nmcli's default.
    pub wait_secs: u64,
    /// Ask for a fresh scan instead of NetworkManager's cached list.
    pub rescan: bool,
}

impl Default for NmcliOptions {
    fn default() -> Self {
        Self {
            program: "nmcli".into(),
            interface: None,
            wait_secs: 0,
            rescan: true,
        }
    }
}

pub struct NmcliAdapter {
    options: NmcliOptions,
}

impl NmcliAdapter {
    pub fn new(options: NmcliOptions) -> Self {
        Self { options }
    }

    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.options.wait_secs > 0 {
            args.push("--wait".into());
            args.push(self.options.wait_secs.to_string());
        }
        args
    }

    pub fn scan_args(&self) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(
            ["-t", "-e", "yes", "-f", SCAN_FIELDS, "device", "wifi", "list"].map(String::from),
        );
        args.push("--rescan".into());
        args.push(if self.options.rescan { "yes" } else { "auto" }.into());
        if let Some(iface) = &self.options.interface {
            args.push("ifname".into());
            args.push(iface.clone());
        }
        args
    }

    pub fn connect_args(
        &self,
        ssid: &str,
        secret: Option<&str>,
        is_wep: bool,
        is_hidden: bool,
    ) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(["device", "wifi", "connect"].map(String::from));
        args.push(ssid.to_string());
        if let Some(secret) = secret {
            args.push("password".into());
            args.push(secret.to_string());
            if is_wep {
                args.push("wep-key-type".into());
                args.push("key".into());
            }
        }
        if is_hidden {
            args.push("hidden".into());
            args.push("yes".into());
        }
        if let Some(iface) = &self.options.interface {
            args.push("ifname".into());
            args.push(iface.clone());
        }
        args
    }

    async fn run(&self, args: &[String]) -> Result<String, AdapterError> {
        let output = Command::new(&self.options.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AdapterError::Spawn {
                program: self.options.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(AdapterError::Command {
                program: self.options.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl WifiAdapter for NmcliAdapter {
    #[instrument(skip(self), fields(adapter = "nmcli", operation = "scan"))]
    async fn scan(&self) -> Result<Vec<RawNetwork>, AdapterError> {
        let stdout = self.run(&self.scan_args()).await?;
        let networks = parse_scan_output(&stdout)?;
        tracing::debug!(count = networks.len(), "nmcli scan parsed");
        Ok(networks)
    }

    #[instrument(skip(self), fields(adapter = "nmcli", operation = "connect_open"))]
    async fn connect_open(&self, ssid: &str) -> Result<(), AdapterError> {
        self.run(&self.connect_args(ssid, None, false, false))
            .await
            .map(|_| ())
    }

    // Secret is skipped so it never reaches the span.
    #[instrument(skip(self, secret), fields(adapter = "nmcli", operation = "connect_secured"))]
    async fn connect_secured(
        &self,
        ssid: &str,
        secret: &str,
        is_wep: bool,
        is_hidden: bool,
    ) -> Result<(), AdapterError> {
        self.run(&self.connect_args(ssid, Some(secret), is_wep, is_hidden))
            .await
            .map(|_| ())
    }

    async fn radio_enabled(&self) -> Result<bool, AdapterError> {
        let mut args = self.global_args();
        args.extend(["radio", "wifi"].map(String::from));
        let stdout = self.run(&args).await?;
        Ok(stdout.trim() == "enabled")
    }
}

/// nmcli reports signal as 0..=100. Map to an approximate dBm in -100..=-50.
pub fn percent_to_dbm(percent: u8) -> i32 {
    i32::from(percent.min(100)) / 2 - 100
}

/// Parse `nmcli -t -e yes -f SSID,BSSID,SIGNAL,SECURITY device wifi list`.
///
/// Blank lines are skipped. Empty SECURITY and `--` mean an open network.
pub fn parse_scan_output(stdout: &str) -> Result<Vec<RawNetwork>, AdapterError> {
    let mut out = Vec::new();
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let fields = split_terse(line);
        let [ssid, bssid, signal, security] = fields.as_slice() else {
            return Err(AdapterError::Output(format!(
                "expected 4 fields, got {}: {:?}",
                fields.len(),
                line
            )));
        };
        let percent: u8 = signal
            .trim()
            .parse()
            .map_err(|_| AdapterError::Output(format!("bad SIGNAL value {:?}", signal)))?;
        let security = security.trim();
        let capabilities = match security {
            "" | "--" => None,
            other => Some(other.to_string()),
        };
        out.push(RawNetwork {
            ssid: ssid.clone(),
            bssid: bssid.clone(),
            level: percent_to_dbm(percent),
            capabilities,
        });
    }
    Ok(out)
}

/// Split a terse line on unescaped `:`; `\:` and `\\` are unescaped.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}
