//! Client error types

use chat_api::HttpError;
use chat_common::ConfigError;
use chat_core::DecodeError;
use chat_gateway::GatewayError;
use thiserror::Error;

/// Errors raised by the client and its dispatcher
#[derive(Debug, Error)]
pub enum ClientError {
    /// An interaction named a command that was never registered
    #[error("Application command `{0}` not found")]
    CommandNotFound(String),

    /// The registered command cannot be invoked as a slash command
    #[error("Application command `{0}` is not a slash command")]
    CommandTypeMismatch(String),

    /// Commands were pushed before Ready delivered the application id
    #[error("Application id is not known yet")]
    MissingApplicationId,

    /// A builder was finished without a required part
    #[error("{0} is required")]
    Incomplete(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type ClientResult<T> = Result<T, ClientError>;
