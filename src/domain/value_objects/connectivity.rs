use serde::{Deserialize, Serialize};

/// Transport reported by the device's network monitor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Offline,
    Online(Transport),
}

impl ConnectionStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionStatus::Online(_))
    }

    /// Whether the connection satisfies a Wi-Fi-only sync policy.
    pub fn is_unmetered(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::Online(Transport::Wifi) | ConnectionStatus::Online(Transport::Ethernet)
        )
    }
}
