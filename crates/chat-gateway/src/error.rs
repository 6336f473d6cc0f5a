//! Gateway errors

use chat_core::DecodeError;
use thiserror::Error;

use crate::events::EventKind;
use crate::protocol::CloseCode;

/// Errors from a waiter that was resolved or torn down
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaiterError {
    /// The waiter was torn down before an event was given to it
    #[error("Waiter for {0} was dropped without an event")]
    Dropped(EventKind),

    /// `wait` was called a second time on the same waiter
    #[error("Waiter for {0} was already awaited")]
    AlreadyAwaited(EventKind),

    /// The awaited frame arrived but could not be decoded
    #[error("Waiter for {kind} failed: {reason}")]
    Failed { kind: EventKind, reason: String },
}

/// Gateway session errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An operation needed an open transport and none was open
    #[error("Gateway connection is not open")]
    NotConnected,

    /// The server closed the connection, or the stream ended
    #[error("Gateway connection closed: {reason}")]
    Closed { code: Option<u16>, reason: String },

    #[error("WebSocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Waiter(#[from] WaiterError),

    /// A critical supervised unit failed
    #[error("Supervised unit `{unit}` failed: {source}")]
    Supervisor {
        unit: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server sent a frame the session cannot handle
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Close code the server sent, when it is one the gateway documents
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Closed { code: Some(code), .. } => CloseCode::from_u16(*code),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
