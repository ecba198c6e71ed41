// Network interface models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// One simulated adapter. Only the byte counters change during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: String,
    pub ip_address: String,
    pub connection_state: ConnectionState,
    pub link_speed_mbps: u32,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl NetworkInterface {
    pub fn new(name: &str, ip_address: &str, link_speed_mbps: u32) -> Self {
        Self {
            name: name.to_string(),
            ip_address: ip_address.to_string(),
            connection_state: ConnectionState::Connected,
            link_speed_mbps,
            bytes_received: 0,
            bytes_sent: 0,
        }
    }
}
