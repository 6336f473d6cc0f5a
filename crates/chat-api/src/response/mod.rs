//! Interaction response bodies

use chat_core::SendMessage;
use serde::{Serialize, Serializer};

/// Interaction callback type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionCallbackType {
    Pong,
    ChannelMessageWithSource,
    DeferredChannelMessageWithSource,
    DeferredUpdateMessage,
    UpdateMessage,
}

impl InteractionCallbackType {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Pong => 1,
            Self::ChannelMessageWithSource => 4,
            Self::DeferredChannelMessageWithSource => 5,
            Self::DeferredUpdateMessage => 6,
            Self::UpdateMessage => 7,
        }
    }
}

impl Serialize for InteractionCallbackType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

/// Body of `POST /interactions/{id}/{token}/callback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionCallbackType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SendMessage>,
}

impl InteractionResponse {
    /// Reply with a message
    #[must_use]
    pub fn message(data: SendMessage) -> Self {
        Self {
            kind: InteractionCallbackType::ChannelMessageWithSource,
            data: Some(data),
        }
    }

    /// Acknowledge now and reply later; the user sees a loading state
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            kind: InteractionCallbackType::DeferredChannelMessageWithSource,
            data: None,
        }
    }
}
