//! Decode errors raised while building typed values from gateway or REST payloads

use thiserror::Error;

/// Errors produced when a payload cannot be turned into a typed value
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload did not match the expected schema
    #[error("Malformed {what} payload: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A key that the schema requires was absent
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    /// A referenced id was not present in the resolved side-table
    #[error("Unresolved {table} entry {id}")]
    Unresolved { table: &'static str, id: String },

    /// An interaction option carried a type code this library does not know
    #[error("Unknown option type {0}")]
    UnknownOptionType(u8),

    /// An interaction carried a type code this library does not handle
    #[error("Unknown interaction type {0}")]
    UnknownInteractionType(u8),

    /// An application command carried a type code this library does not handle
    #[error("Unknown application command type {0}")]
    UnknownCommandType(u8),

    /// A field had the right key but an unusable value
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl DecodeError {
    /// Build a `Malformed` error for the named payload kind
    pub fn malformed(what: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { what, source }
    }

    /// Deserialize `value` into `T`, tagging failures with `what`
    pub fn from_value<T>(what: &'static str, value: serde_json::Value) -> DecodeResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(value).map_err(|e| Self::malformed(what, e))
    }
}

/// Result type for decoding
pub type DecodeResult<T> = Result<T, DecodeError>;
