//! Per-request context handed to middleware and handlers

use axum::http::{HeaderMap, header};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::HttpMethod;

/// Context wrapper providing access to application state and request metadata.
///
/// The application state is shared across requests behind an `Arc`; the
/// metadata belongs to the current call only. Cloning is cheap.
pub struct Context<T: Send + Sync + 'static> {
    state: Arc<T>,
    meta: Arc<RequestMeta>,
}

impl<T: Send + Sync + 'static> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Context<T> {
    /// Create a context for one request.
    pub fn new(state: Arc<T>, meta: RequestMeta) -> Self {
        Self {
            state,
            meta: Arc::new(meta),
        }
    }

    /// Create a context with empty request metadata.
    pub fn from_state(state: T) -> Self {
        Self::new(Arc::new(state), RequestMeta::default())
    }

    /// Get a reference to the application state
    pub fn inner(&self) -> &T {
        &self.state
    }

    /// Get the Arc for sharing
    pub fn arc(&self) -> Arc<T> {
        self.state.clone()
    }

    /// Metadata of the inbound request.
    pub fn meta(&self) -> &RequestMeta {
        &self.meta
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.meta.headers
    }

    pub fn cookies(&self) -> &Cookies {
        &self.meta.cookies
    }

    pub fn request_id(&self) -> Uuid {
        self.meta.request_id
    }
}

impl<T: Send + Sync + 'static> std::ops::Deref for Context<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<T: Send + Sync + 'static + Default> Default for Context<T> {
    fn default() -> Self {
        Self::from_state(T::default())
    }
}

/// Empty state for apps that don't need any
#[derive(Clone, Default, Debug)]
pub struct EmptyContext;

/// Inbound request metadata.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Unique id of this call, also recorded on the tracing span
    pub request_id: Uuid,
    /// HTTP method the request arrived with
    pub method: HttpMethod,
    /// Endpoint path as received, e.g. `user/getAll`
    pub endpoint: String,
    pub headers: HeaderMap,
    pub cookies: Cookies,
    /// Decoded query string parameters
    pub query: HashMap<String, String>,
}

impl RequestMeta {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>, headers: HeaderMap) -> Self {
        let cookies = Cookies::from_headers(&headers);
        Self {
            request_id: Uuid::now_v7(),
            method,
            endpoint: endpoint.into(),
            headers,
            cookies,
            query: HashMap::new(),
        }
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self::new(HttpMethod::default(), String::new(), HeaderMap::new())
    }
}

/// Cookies sent with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    values: HashMap<String, String>,
}

impl Cookies {
    /// Parse every `Cookie` header; later duplicates win.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().trim_matches('"').to_string()))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// All cookies sorted by name.
    pub fn get_all(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<_> = self
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all.sort();
        all
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
