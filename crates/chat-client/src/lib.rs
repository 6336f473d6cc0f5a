//! # chat-client
//!
//! Application-facing layer: per-event callbacks, application command
//! declarations and invocation, and the [`Client`] that wires the REST client
//! and the gateway session together.

pub mod client;
pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod error;

pub use client::{Client, ClientBuilder};
pub use commands::{ApplicationCommand, CommandCallback, CommandOption, OptionChoice, OptionValue};
pub use context::SlashCommandContext;
pub use dispatcher::{Dispatcher, EventCallback};
pub use error::{ClientError, ClientResult};

// The event types callbacks receive
pub use chat_gateway::{Event, EventKind};
