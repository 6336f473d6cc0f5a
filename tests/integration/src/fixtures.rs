//! Test fixtures and payload builders
//!
//! Provides reusable gateway payloads for integration tests.

use serde_json::{json, Value};

/// Application id every fixture uses
pub const APPLICATION_ID: u64 = 11;

/// Session id carried by [`ready_payload`]
pub const SESSION_ID: &str = "session-1";

/// READY payload for a bot in one unavailable guild
pub fn ready_payload() -> Value {
    json!({
        "v": 9,
        "user": {"id": "10", "username": "testbot", "discriminator": "0001", "bot": true},
        "guilds": [{"id": "7", "unavailable": true}],
        "session_id": SESSION_ID,
        "resume_gateway_url": "wss://resume.example",
        "application": {"id": APPLICATION_ID.to_string(), "flags": 0}
    })
}

/// INTERACTION_CREATE payload for a chat-input command
pub fn interaction_payload(id: u64, name: &str, options: Value) -> Value {
    json!({
        "id": id.to_string(),
        "application_id": APPLICATION_ID.to_string(),
        "type": 2,
        "token": format!("token-{id}"),
        "version": 1,
        "guild_id": "7",
        "channel_id": "8",
        "member": {
            "user": {"id": "1", "username": "alice", "discriminator": "0001"},
            "roles": [],
            "joined_at": "2021-01-01T00:00:00Z",
            "deaf": false,
            "mute": false
        },
        "data": {
            "id": "500",
            "name": name,
            "type": 1,
            "options": options
        }
    })
}
