//! Error body shared by every remote API failure

mod error_response;

pub use error_response::ErrorResponse;
