//! Typed gateway events

use chat_core::{Guild, Interaction, Message};

use super::{EventKind, ReadyEvent, UnknownEvent};
use crate::protocol::HelloPayload;

/// A decoded gateway event
///
/// Immutable once built; shared between waiters and callbacks as `Arc<Event>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Unknown(UnknownEvent),
    Hello(HelloPayload),
    HeartbeatAck,
    /// The server asked for an immediate heartbeat
    HeartbeatRequest,
    Reconnect,
    /// `true` when the session may be resumed
    InvalidSession(bool),
    Ready(Box<ReadyEvent>),
    InteractionCreate(Box<Interaction>),
    MessageCreate(Box<Message>),
    GuildCreate(Box<Guild>),
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Unknown(_) => EventKind::Unknown,
            Self::Hello(_) => EventKind::Hello,
            Self::HeartbeatAck => EventKind::HeartbeatAck,
            Self::HeartbeatRequest => EventKind::HeartbeatRequest,
            Self::Reconnect => EventKind::Reconnect,
            Self::InvalidSession(_) => EventKind::InvalidSession,
            Self::Ready(_) => EventKind::Ready,
            Self::InteractionCreate(_) => EventKind::InteractionCreate,
            Self::MessageCreate(_) => EventKind::MessageCreate,
            Self::GuildCreate(_) => EventKind::GuildCreate,
        }
    }

    pub fn as_hello(&self) -> Option<&HelloPayload> {
        match self {
            Self::Hello(hello) => Some(hello),
            _ => None,
        }
    }

    pub fn as_ready(&self) -> Option<&ReadyEvent> {
        match self {
            Self::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn as_interaction(&self) -> Option<&Interaction> {
        match self {
            Self::InteractionCreate(interaction) => Some(interaction),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::MessageCreate(message) => Some(message),
            _ => None,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(unknown) => match &unknown.name {
                Some(name) => write!(f, "Unknown(op={}, t={name})", unknown.op),
                None => write!(f, "Unknown(op={})", unknown.op),
            },
            other => f.write_str(other.kind().as_str()),
        }
    }
}
