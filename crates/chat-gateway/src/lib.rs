//! # chat-gateway
//!
//! Client side of the real-time gateway: protocol frames, typed events, the
//! session handshake and heartbeat, and the task supervisor that runs them.

pub mod connection;
pub mod error;
pub mod events;
pub mod protocol;
pub mod supervisor;
pub mod waiter;

pub use connection::{gateway_url, EventHandler, GatewaySession, NoopHandler, SessionState};
pub use error::{GatewayError, GatewayResult, WaiterError};
pub use events::{Event, EventKind, EventRegistry, ReadyEvent, UnknownEvent};
pub use protocol::{CloseCode, GatewayMessage, HelloPayload, IdentifyPayload, OpCode};
pub use supervisor::{Supervisor, UnitResult};
pub use waiter::EventWaiter;
