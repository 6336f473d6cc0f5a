//! Remote error body
//!
//! The platform answers failed requests with `{code, message, errors?}`. Bodies
//! that are not JSON (proxies, gateways) are kept verbatim in `message`.

use serde::{Deserialize, Serialize};

/// Error body returned by the remote API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub message: String,
    /// Per-field validation errors, when the platform sends them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    /// Seconds to wait, present on 429 responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<f64>,
}

impl ErrorResponse {
    /// Parse a raw response body, falling back to the text itself
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            message: body.trim().to_string(),
            ..Self::default()
        })
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (code {})", self.message, self.code)
        }
    }
}
