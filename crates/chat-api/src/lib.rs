//! # chat-api
//!
//! REST client for the chat platform's HTTP API: gateway discovery, application
//! command registration, and interaction callbacks.

pub mod client;
pub mod error;
pub mod response;
pub mod routes;

// Re-export commonly used types at crate root
pub use client::HttpClient;
pub use error::{HttpError, HttpResult, RemoteError};
pub use response::{InteractionCallbackType, InteractionResponse};
pub use routes::Route;
