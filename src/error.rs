// Error handling module
// Defines the error taxonomy of the E37 client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to an E37 device
#[derive(Error, Debug)]
pub enum E37Error {
    /// Invalid connection options (bad URL)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Login failed or the session could not be re-established
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Non-200 response to an authenticated data request
    #[error("error handling request for {endpoint} http-statuscode: {status}")]
    E37ApiError { endpoint: String, status: StatusCode },

    /// Response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    DecodeError(#[from] serde_json::Error),

    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl E37Error {
    /// Whether the failure happened while acquiring or refreshing a token
    pub fn is_auth(&self) -> bool {
        matches!(self, E37Error::AuthError(_))
    }
}

/// Result type alias for E37 operations
pub type Result<T> = std::result::Result<T, E37Error>;
