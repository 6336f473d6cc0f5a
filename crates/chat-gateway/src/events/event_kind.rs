//! Event kinds
//!
//! The discriminant of [`Event`](super::Event), used for waiter matching,
//! callback registration, and registry lookups.

use std::fmt;

/// Gateway event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Fallback for frames no registration matched
    Unknown,

    // Connection lifecycle (resolved by opcode)
    /// Op 10, first frame after connect
    Hello,
    /// Op 11
    HeartbeatAck,
    /// Op 1 sent by the server
    HeartbeatRequest,
    /// Op 7
    Reconnect,
    /// Op 9
    InvalidSession,

    // Dispatches (resolved by type name)
    /// Sent after a successful Identify
    Ready,
    /// A user invoked an application command
    InteractionCreate,
    /// New message
    MessageCreate,
    /// Guild available, joined, or created
    GuildCreate,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 10] = [
        Self::Unknown,
        Self::Hello,
        Self::HeartbeatAck,
        Self::HeartbeatRequest,
        Self::Reconnect,
        Self::InvalidSession,
        Self::Ready,
        Self::InteractionCreate,
        Self::MessageCreate,
        Self::GuildCreate,
    ];

    /// Name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Hello => "HELLO",
            Self::HeartbeatAck => "HEARTBEAT_ACK",
            Self::HeartbeatRequest => "HEARTBEAT",
            Self::Reconnect => "RECONNECT",
            Self::InvalidSession => "INVALID_SESSION",
            Self::Ready => "READY",
            Self::InteractionCreate => "INTERACTION_CREATE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::GuildCreate => "GUILD_CREATE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
