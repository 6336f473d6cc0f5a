//! Handshake payloads
//!
//! Hello arrives from the server; Identify is the client's answer.

use chat_core::Intents;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.heartbeat_interval)
    }
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Raw bot token, without the `Bot ` prefix
    pub token: String,
    pub properties: IdentifyProperties,
    pub intents: Intents,
}

impl IdentifyPayload {
    /// Build an identify payload; strips an HTTP-style `Bot ` prefix from the token
    pub fn new(token: &str, intents: Intents, client_name: &str) -> Self {
        let token = token.trim();
        Self {
            token: token.strip_prefix("Bot ").unwrap_or(token).to_string(),
            properties: IdentifyProperties::for_client(client_name),
            intents,
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,
    /// Library name
    pub browser: String,
    /// Library name
    pub device: String,
}

impl IdentifyProperties {
    /// Properties for this host, reporting `client_name` as browser and device
    #[must_use]
    pub fn for_client(client_name: &str) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: client_name.to_string(),
            device: client_name.to_string(),
        }
    }
}
