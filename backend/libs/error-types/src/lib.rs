//! Shared HTTP error body for Nova services.
//!
//! Every service maps its own error enum onto [`ErrorResponse`] so clients see a single
//! JSON shape regardless of which service failed.

use serde::{Deserialize, Serialize};

/// Unified API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP reason phrase, e.g. "Bad Request"
    pub error: String,

    /// Human-readable explanation; never contains secrets or message content
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Coarse category for client-side routing, see [`error_types`]
    pub error_type: String,

    /// Stable machine code, see [`error_codes`]
    pub code: String,

    /// RFC 3339
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub mod error_codes {
    // Authentication
    pub const CALLER_IDENTITY_MISSING: &str = "CALLER_IDENTITY_MISSING";

    // Messaging
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_KEY: &str = "INVALID_KEY";
    pub const DECRYPTION_FAILED: &str = "DECRYPTION_FAILED";
    pub const PUBLIC_KEY_NOT_FOUND: &str = "PUBLIC_KEY_NOT_FOUND";

    // Database/System
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const SERVER_ERROR: &str = "server_error";
}
