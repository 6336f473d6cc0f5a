//! Event payload definitions

use chat_core::{Application, UnavailableGuild, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// READY event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u8,

    /// The bot user
    pub user: User,

    /// Guilds the bot is in; each arrives later as GUILD_CREATE
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming
    #[serde(default)]
    pub resume_gateway_url: Option<String>,

    /// The bot's application
    pub application: Application,
}

/// A frame that resolved to no registered event kind
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEvent {
    pub op: u8,
    pub name: Option<String>,
    pub data: Value,
}
