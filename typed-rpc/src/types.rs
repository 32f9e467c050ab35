//! Common types for RPC
//!
//! These types cross the wire. When modifying them, update the client
//! bindings as well.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{RpcError, RpcResult};

/// HTTP methods a procedure can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    #[default]
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
}

impl HttpMethod {
    /// All supported methods.
    pub const ALL: [HttpMethod; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Head,
    ];

    /// Lowercase name as used in router declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
        }
    }

    /// Convert into the `http` crate's method type.
    pub fn to_http(self) -> axum::http::Method {
        use axum::http::Method;
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
            Self::Options => Method::OPTIONS,
            Self::Head => Method::HEAD,
        }
    }

    /// Map an inbound `http` method; `None` for verbs no procedure can use.
    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RpcError;

    fn from_str(s: &str) -> RpcResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RpcError::endpoint_not_found().with_cause(format!("unknown method {s}")))
    }
}

/// The base output shape every procedure returns.
///
/// `status` becomes the HTTP status, `data` the response body and `message`
/// the reason phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterOutput<T = serde_json::Value> {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> RouterOutput<T> {
    /// A 200 response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
            message: None,
        }
    }

    /// A response with only a status.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            data: None,
            message: None,
        }
    }

    /// A failure response; the adapter turns it into an HTTP error.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::empty(status).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Whether `status` is a valid HTTP status code.
    pub fn has_valid_status(&self) -> bool {
        (100..=599).contains(&self.status)
    }

    /// Whether the adapter reports this output as an HTTP error.
    pub fn is_failure(&self) -> bool {
        self.status > 399
    }

    /// Convert the payload, keeping status and message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RouterOutput<U> {
        RouterOutput {
            status: self.status,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

/// Input type for procedures that take nothing.
///
/// Accepts `null` (an empty GET body) and any object; unknown keys are
/// ignored, like a struct without fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoInput {}

impl<'de> Deserialize<'de> for NoInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(NoInput {}),
            serde_json::Value::Object(_) => Ok(NoInput {}),
            other => Err(serde::de::Error::custom(format!(
                "expected null or an object, got {other}"
            ))),
        }
    }
}
