//! Error types for RPC operations
//!
//! Every failure raised while resolving, validating or executing a procedure
//! is an [`RpcError`]. Each [`RpcErrorCode`] maps onto an HTTP status so the
//! transport adapter can turn the error into a response without extra
//! bookkeeping.
//!
//! # Example
//! ```rust,ignore
//! use typed_rpc::{RpcError, RpcErrorCode};
//!
//! let error = RpcError::new(RpcErrorCode::BadInput, "Bad input request.");
//! let error = RpcError::endpoint_not_found(); // Convenience constructor
//! let error = RpcError::http(409, "User already exists");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Type-safe error codes for RPC operations.
///
/// When serialized to JSON, codes are converted to SCREAMING_SNAKE_CASE
/// (e.g., `BadEndpoint` becomes `"BAD_ENDPOINT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcErrorCode {
    // Dispatch errors
    /// The path does not resolve to a router/procedure chain
    BadEndpoint,
    /// The path is well formed but no procedure answers it
    EndpointNotFound,

    // Contract errors
    /// The payload failed the procedure's input contract
    BadInput,
    /// The handler result failed the procedure's output contract
    BadOutput,
    /// The handler returned a status outside [100, 599]
    InvalidStatus,

    // Handler / middleware errors
    /// A handler reported a failure with its own HTTP status
    HandlerFailure,
    /// Authentication is required
    Unauthorized,
    /// The caller lacks permission
    Forbidden,
    /// The request payload exceeds size limits
    PayloadTooLarge,

    // Server errors
    /// An unexpected internal error occurred
    InternalError,
}

impl RpcErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadEndpoint => "BAD_ENDPOINT",
            Self::EndpointNotFound => "ENDPOINT_NOT_FOUND",
            Self::BadInput => "BAD_INPUT",
            Self::BadOutput => "BAD_OUTPUT",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::HandlerFailure => "HANDLER_FAILURE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Default HTTP status for this code.
    ///
    /// `HandlerFailure` has no fixed status; errors carrying it store the
    /// handler's status explicitly and fall back to 500 here.
    pub fn default_status(&self) -> u16 {
        match self {
            Self::BadEndpoint | Self::BadInput | Self::BadOutput | Self::InvalidStatus => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::EndpointNotFound => 404,
            Self::PayloadTooLarge => 413,
            Self::HandlerFailure | Self::InternalError => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.default_status())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.default_status())
    }
}

impl fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// RPC error with type-safe code and message.
///
/// # Example
/// ```rust,ignore
/// use typed_rpc::{RpcError, RpcErrorCode};
///
/// let error = RpcError::new(RpcErrorCode::BadInput, "Bad input request.")
///     .with_details(serde_json::json!([{"field": "email"}]))
///     .with_cause("missing field `email`");
/// assert_eq!(error.status(), 400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct RpcError {
    /// Type-safe error code
    pub code: RpcErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (JSON value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Optional cause for debugging (not exposed to clients for internal errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Explicit HTTP status, overriding the code's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl RpcError {
    /// Create a new error with code and message.
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            cause: None,
            status: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Add a cause string for debugging.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// HTTP status this error should be reported with.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or_else(|| self.code.default_status())
    }

    /// Returns true if the reported status is 4xx.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns true if the reported status is 5xx.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status())
    }

    /// Sanitize error for client response (removes internal details for server errors).
    pub fn sanitize(mut self) -> Self {
        if matches!(self.code, RpcErrorCode::InternalError) {
            self.message = "An internal error occurred".to_string();
            self.details = None;
        }
        self.cause = None;
        self
    }

    // Convenience constructors

    /// Create a BAD_ENDPOINT error.
    pub fn bad_endpoint() -> Self {
        Self::new(RpcErrorCode::BadEndpoint, "Bad endpoint request.")
    }

    /// Create an ENDPOINT_NOT_FOUND error.
    pub fn endpoint_not_found() -> Self {
        Self::new(RpcErrorCode::EndpointNotFound, "Endpoint not found.")
    }

    /// Create a BAD_INPUT error.
    pub fn bad_input() -> Self {
        Self::new(RpcErrorCode::BadInput, "Bad input request.")
    }

    /// Create a BAD_OUTPUT error.
    pub fn bad_output() -> Self {
        Self::new(RpcErrorCode::BadOutput, "Bad output request.")
    }

    /// Create an INVALID_STATUS error.
    pub fn invalid_status(status: u16) -> Self {
        Self::new(RpcErrorCode::InvalidStatus, "Invalid Http status code.")
            .with_details(serde_json::json!({ "status": status }))
    }

    /// Create a HANDLER_FAILURE error carrying the handler's own status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let mut error = Self::new(RpcErrorCode::HandlerFailure, message);
        error.status = Some(status);
        error
    }

    /// Create an UNAUTHORIZED error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::Unauthorized, message)
    }

    /// Create a FORBIDDEN error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::Forbidden, message)
    }

    /// Create a PAYLOAD_TOO_LARGE error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::PayloadTooLarge, message)
    }

    /// Create an INTERNAL_ERROR error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

/// Result type alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
