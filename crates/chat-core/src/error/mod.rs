//! Decode errors - failures turning wire payloads into typed values

mod decode_error;

pub use decode_error::{DecodeError, DecodeResult};
