//! Integration test utilities for the bot client
//!
//! This crate provides an in-process gateway and REST API so the client can be
//! driven end to end without network access.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
