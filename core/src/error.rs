//! Error types for the Flincap API client.
//!
//! # Design
//! Every failure is handed back to the caller unchanged: nothing is retried
//! or recovered inside the client. `Api` carries the server's error envelope
//! so callers can branch on `code`; `Decode` keeps the serde error as its
//! source and records which body failed to decode.

use std::fmt;

use thiserror::Error;

/// Which response body failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeContext {
    /// The body of a 200 response.
    ResponseData,
    /// The body of a non-200 response, expected to be an error envelope.
    ErrorResponse,
}

impl fmt::Display for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeContext::ResponseData => f.write_str("response data"),
            DecodeContext::ErrorResponse => f.write_str("error response"),
        }
    }
}

/// Errors returned by `FlincapClient`.
#[derive(Error, Debug)]
pub enum FlincapError {
    /// The target URL could not be built from the base URL and route.
    #[error("failed to create request: {0}")]
    Construction(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to marshal payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The round-trip failed below HTTP (DNS, refused connection, timeout).
    #[error("failed to send request: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-200 status and an error envelope.
    #[error("API error: {message} (code: {code})")]
    Api {
        status: u16,
        message: String,
        code: String,
    },

    /// A response body was not valid JSON or not the expected shape.
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: DecodeContext,
        #[source]
        source: serde_json::Error,
    },
}

impl FlincapError {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FlincapError::Transport(err.into())
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, FlincapError::Api { .. })
    }

    /// The envelope `code` if this is an API error.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            FlincapError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type alias for Flincap operations.
pub type Result<T> = std::result::Result<T, FlincapError>;
