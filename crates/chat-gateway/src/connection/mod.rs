//! Gateway connection
//!
//! The WebSocket transport and the session that drives it.

mod session;
mod transport;

pub use session::{EventHandler, GatewaySession, NoopHandler, SessionState};
pub use transport::gateway_url;
