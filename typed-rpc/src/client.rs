//! HTTP client for calling procedures by endpoint
//!
//! [`RpcClient::call`] takes an [`Endpoint`] type, so the path, method and
//! payload types of a call always match what the server registered.
//!
//! Failures do not surface as errors. A transport failure or a non-2xx
//! response is reported to the [`Notifier`] and the call yields `None`; a 2xx
//! response whose body does not parse yields [`ApiResponse::Fallback`].
//!
//! # Example
//! ```rust,ignore
//! let client = RpcClient::new("http://127.0.0.1:3000");
//!
//! match client.call::<GetAll>(&NoInput {}, RequestOptions::default()).await {
//!     Some(ApiResponse::Data(user)) => println!("{}", user.name),
//!     Some(ApiResponse::Fallback(output)) => println!("{:?}", output.message),
//!     None => {} // already notified
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::{HttpMethod, RouterOutput, RpcError};

/// Title of the notification raised for a failed call.
pub const REQUEST_FAILED: &str = "The request failed!";

/// Receives user-facing failure notifications.
pub trait Notifier: Send + Sync {
    fn error(&self, title: &str, description: &str);
}

/// Default notifier: logs at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, title: &str, description: &str) {
        tracing::error!(description = %description, "{}", title);
    }
}

/// Result of a call that reached the server with a 2xx status.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The body parsed as the endpoint's output
    Data(T),
    /// The body did not parse; `message` holds the raw text and `status` is 404
    Fallback(RouterOutput),
}

impl<T> ApiResponse<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Per-request options. Body and method are set by the call itself.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for a server mounting `typed_rpc::http::rpc_routes`.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
    notifier: Arc<dyn Notifier>,
}

impl RpcClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_prefix: "/api".to_string(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Use a preconfigured `reqwest` client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Mount point of the RPC routes on the server (default: /api).
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// URL of a dotted or slashed endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_prefix, path.replace('.', "/"))
    }

    /// Call a declared endpoint.
    pub async fn call<E: Endpoint>(
        &self,
        input: &E::Input,
        options: RequestOptions,
    ) -> Option<ApiResponse<E::Output>> {
        let input = match serde_json::to_value(input) {
            Ok(input) => input,
            Err(e) => {
                self.notifier.error(REQUEST_FAILED, &e.to_string());
                return None;
            }
        };
        self.call_path(E::PATH, E::METHOD, input, options).await
    }

    /// Call any path; the output type is chosen by the caller.
    pub async fn call_path<T: DeserializeOwned>(
        &self,
        path: &str,
        method: HttpMethod,
        input: serde_json::Value,
        options: RequestOptions,
    ) -> Option<ApiResponse<T>> {
        let url = self.url(path);
        tracing::debug!(url = %url, method = %method, "Calling endpoint");

        let mut request = self
            .http
            .request(method.to_http(), &url)
            .headers(options.headers)
            .json(&input);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.notifier.error(REQUEST_FAILED, &e.to_string());
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .extensions()
                .get::<ReasonPhrase>()
                .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned());
            let body = response.text().await.unwrap_or_default();
            let description = reason
                .or_else(|| {
                    serde_json::from_str::<RpcError>(&body)
                        .ok()
                        .map(|error| error.message)
                })
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            self.notifier.error(REQUEST_FAILED, &description);
            return None;
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                self.notifier.error(REQUEST_FAILED, &e.to_string());
                return None;
            }
        };
        match serde_json::from_str::<T>(&text) {
            Ok(data) => Some(ApiResponse::Data(data)),
            Err(e) => {
                tracing::debug!(error = %e, "Response body did not parse");
                Some(ApiResponse::Fallback(RouterOutput::error(404, text)))
            }
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("base_url", &self.base_url)
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}
