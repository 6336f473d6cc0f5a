//! Gateway events
//!
//! Typed events decoded from inbound frames, and the registry that maps wire
//! discriminators to event kinds.

mod event;
mod event_kind;
mod payloads;
mod registry;

pub use event::Event;
pub use event_kind::EventKind;
pub use payloads::{ReadyEvent, UnknownEvent};
pub use registry::EventRegistry;
