//! Event type registry
//!
//! Maps wire discriminators to event kinds: dispatch frames (op 0 with a type
//! name) are looked up by name, everything else by opcode. Built once, then
//! shared read-only.

use std::collections::HashMap;

use chat_core::{DecodeError, DecodeResult};
use tracing::warn;

use super::{Event, EventKind, UnknownEvent};
use crate::protocol::{GatewayMessage, OpCode};

/// Registry of opcode and type-name mappings
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    opcodes: HashMap<u8, EventKind>,
    types: HashMap<String, EventKind>,
}

impl EventRegistry {
    /// Create an empty registry; every frame resolves to [`EventKind::Unknown`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every event kind this library decodes
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register_opcode(OpCode::Hello.as_u8(), EventKind::Hello)
            .register_opcode(OpCode::HeartbeatAck.as_u8(), EventKind::HeartbeatAck)
            .register_opcode(OpCode::Heartbeat.as_u8(), EventKind::HeartbeatRequest)
            .register_opcode(OpCode::Reconnect.as_u8(), EventKind::Reconnect)
            .register_opcode(OpCode::InvalidSession.as_u8(), EventKind::InvalidSession)
            .register_type("READY", EventKind::Ready)
            .register_type("INTERACTION_CREATE", EventKind::InteractionCreate)
            .register_type("MESSAGE_CREATE", EventKind::MessageCreate)
            .register_type("GUILD_CREATE", EventKind::GuildCreate);
        registry
    }

    /// Map an opcode to a kind; a later registration for the same opcode wins
    pub fn register_opcode(&mut self, op: u8, kind: EventKind) -> &mut Self {
        self.opcodes.insert(op, kind);
        self
    }

    /// Map a dispatch type name to a kind; a later registration for the same name wins
    pub fn register_type(&mut self, name: impl Into<String>, kind: EventKind) -> &mut Self {
        self.types.insert(name.into(), kind);
        self
    }

    /// Resolve a frame's discriminators to a kind, falling back to `Unknown`
    pub fn resolve(&self, op: u8, name: Option<&str>) -> EventKind {
        let found = match name {
            Some(name) if op == OpCode::Dispatch.as_u8() => self.types.get(name),
            _ => self.opcodes.get(&op),
        };

        match found {
            Some(kind) => *kind,
            None => {
                warn!(op, name = name.unwrap_or_default(), "Unknown gateway event");
                EventKind::Unknown
            }
        }
    }

    /// Build the typed event for a frame
    pub fn decode(&self, frame: &GatewayMessage) -> DecodeResult<Event> {
        let kind = self.resolve(frame.op, frame.t.as_deref());
        let data = frame.d.clone();

        Ok(match kind {
            EventKind::Unknown => Event::Unknown(UnknownEvent {
                op: frame.op,
                name: frame.t.clone(),
                data,
            }),
            EventKind::Hello => Event::Hello(DecodeError::from_value("HELLO", data)?),
            EventKind::HeartbeatAck => Event::HeartbeatAck,
            EventKind::HeartbeatRequest => Event::HeartbeatRequest,
            EventKind::Reconnect => Event::Reconnect,
            EventKind::InvalidSession => Event::InvalidSession(data.as_bool().unwrap_or(false)),
            EventKind::Ready => Event::Ready(Box::new(DecodeError::from_value("READY", data)?)),
            EventKind::InteractionCreate => Event::InteractionCreate(Box::new(
                DecodeError::from_value("INTERACTION_CREATE", data)?,
            )),
            EventKind::MessageCreate => {
                Event::MessageCreate(Box::new(DecodeError::from_value("MESSAGE_CREATE", data)?))
            }
            EventKind::GuildCreate => {
                Event::GuildCreate(Box::new(DecodeError::from_value("GUILD_CREATE", data)?))
            }
        })
    }

    /// Number of opcode and type-name registrations
    #[must_use]
    pub fn len(&self) -> usize {
        self.opcodes.len() + self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
