// Error handling module
// Defines the error taxonomy surfaced by the client

use thiserror::Error;

/// Errors that can occur while dispatching API requests
#[derive(Error, Debug)]
pub enum ApiError {
    /// Re-authentication is required; callers should route to login
    #[error("Authentication expired, please log in again")]
    AuthExpired,

    /// Access token payload could not be decoded
    #[error("Failed to decode access token: {0}")]
    TokenDecode(String),

    /// Refresh endpoint rejected the token exchange
    #[error("Token refresh failed with status {status}")]
    RefreshFailed { status: u16 },

    /// Non-success response from the Blogline API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
