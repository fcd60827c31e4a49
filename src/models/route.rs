// Navigation targets. Each screen carries exactly the parameters it renders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    #[default]
    Home,
    ConnectionSuccess {
        ssid: String,
    },
}

impl Screen {
    pub fn connection_success(ssid: impl Into<String>) -> Self {
        Screen::ConnectionSuccess { ssid: ssid.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::ConnectionSuccess { .. } => "connectionSuccess",
        }
    }
}
