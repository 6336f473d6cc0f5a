//! # chat-common
//!
//! Shared utilities including configuration, the remote error body, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{ClientConfig, ConfigError, DEFAULT_API_BASE_URL, DEFAULT_GATEWAY_VERSION};
pub use error::ErrorResponse;
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
