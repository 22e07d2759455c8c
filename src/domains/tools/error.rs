//! Tool-specific error types.
//!
//! [`ToolError`] is raised before a handler runs and reaches the client as a
//! JSON-RPC error, while
//! [`UpstreamError`] is raised while a handler runs and is always folded into
//! an `isError: true` tool result by the registry.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use thiserror::Error;

/// Protocol-level errors raised while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A required argument is missing, empty, or has the wrong shape.
    #[error("{0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// JSON-RPC error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            Self::InvalidArguments(_) => ErrorCode::INVALID_PARAMS,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError::new(err.code(), err.to_string(), None)
    }
}

/// Errors raised while talking to an upstream HTTP API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API answered with a non-success status.
    #[error("API request failed with status {0}")]
    Status(u16),

    /// The request could not be completed or its body could not be decoded.
    #[error("{0}")]
    Request(String),
}

impl UpstreamError {
    /// Message used when the underlying failure carries no text.
    pub const FALLBACK_MESSAGE: &'static str = "Failed to fetch data";

    /// Create a request error, substituting the fallback for an empty message.
    pub fn request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.is_empty() {
            Self::Request(Self::FALLBACK_MESSAGE.to_string())
        } else {
            Self::Request(msg)
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::request(err.to_string())
    }
}
