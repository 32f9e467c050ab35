//! axum integration
//!
//! Mounts an [`AppRouter`] on a catch-all route, `{prefix}/{*endpoints}`,
//! that accepts every method. Each request is turned into a [`Context`], dispatched,
//! and its [`RouterOutput`] (or [`RpcError`]) turned back into a response:
//!
//! * status: `RouterOutput::status`
//! * body: `RouterOutput::data` as JSON (`null` when absent)
//! * reason phrase: `RouterOutput::message`
//!
//! Outputs with a status above 399 become error responses. The bare prefix
//! (`{prefix}` and `{prefix}/`) names no procedure and answers `BAD_ENDPOINT`,
//! except for `GET {prefix}` which serves the manifest when enabled.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use hyper::ext::ReasonPhrase;
use tracing::Instrument;

use crate::context::RequestMeta;
use crate::validation::validate_input_size;
use crate::{AppRouter, Context, HttpMethod, RouterOutput, RpcConfig, RpcError};

/// Shared state of the RPC routes.
pub struct RpcState<Ctx: Send + Sync + 'static> {
    router: Arc<AppRouter<Ctx>>,
    state: Arc<Ctx>,
    config: Arc<RpcConfig>,
}

impl<Ctx: Send + Sync + 'static> Clone for RpcState<Ctx> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            state: self.state.clone(),
            config: self.config.clone(),
        }
    }
}

/// Build the axum routes serving `router`.
///
/// # Example
/// ```rust,ignore
/// let app = rpc_routes(Arc::new(app_router()), Arc::new(AppContext::default()), RpcConfig::default())
///     .layer(TraceLayer::new_for_http());
/// axum::serve(listener, app).await?;
/// ```
pub fn rpc_routes<Ctx>(router: Arc<AppRouter<Ctx>>, state: Arc<Ctx>, config: RpcConfig) -> axum::Router
where
    Ctx: Send + Sync + 'static,
{
    let prefix = config.api_prefix.clone();
    let shared = RpcState {
        router,
        state,
        config: Arc::new(config),
    };

    axum::Router::new()
        .route(&prefix, any(handle_root::<Ctx>))
        .route(&format!("{}/", prefix), any(handle_root::<Ctx>))
        .route(&format!("{}/{{*endpoints}}", prefix), any(handle_call::<Ctx>))
        .with_state(shared)
}

async fn handle_root<Ctx: Send + Sync + 'static>(State(rpc): State<RpcState<Ctx>>, method: Method) -> Response {
    if method == Method::GET && rpc.config.expose_manifest {
        return Json(rpc.router.manifest()).into_response();
    }
    if HttpMethod::from_http(&method).is_none() {
        return method_not_allowed(&method);
    }
    RpcError::bad_endpoint()
        .with_cause("path needs a router and a procedure")
        .into_response()
}

async fn handle_call<Ctx: Send + Sync + 'static>(
    State(rpc): State<RpcState<Ctx>>,
    Path(endpoint): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let Some(rpc_method) = HttpMethod::from_http(&method) else {
        return method_not_allowed(&method);
    };

    let meta = RequestMeta::new(rpc_method, endpoint.clone(), headers).with_query(query);
    let span = tracing::info_span!(
        "rpc_call",
        request_id = %meta.request_id,
        method = %rpc_method,
        endpoint = %endpoint,
    );

    async move {
        let input = match read_input(&rpc.config, &meta.headers, body).await {
            Ok(input) => input,
            Err(error) => return error.into_response(),
        };
        if rpc.config.debug_logging {
            tracing::debug!(input = %input, "Request input");
        }

        let ctx = Context::new(rpc.state.clone(), meta);
        match rpc.router.dispatch(ctx, &endpoint, rpc_method, input).await {
            Ok(output) => into_response(output),
            Err(error) => error.into_response(),
        }
    }
    .instrument(span)
    .await
}

/// Read the request body as JSON; an empty body is `null`.
async fn read_input(config: &RpcConfig, headers: &HeaderMap, body: Body) -> Result<serde_json::Value, RpcError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(size) = declared {
        validate_input_size(size, config)?;
    }

    let bytes = axum::body::to_bytes(body, config.max_input_size)
        .await
        .map_err(|e| {
            let source = e.into_inner();
            if source.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
                RpcError::payload_too_large(format!(
                    "Input exceeds maximum {} bytes",
                    config.max_input_size
                ))
            } else {
                RpcError::bad_input().with_cause(source.to_string())
            }
        })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "Request body is not valid JSON");
        RpcError::bad_input().with_details(serde_json::json!([{
            "field": "",
            "message": e.to_string(),
            "code": "invalid_json",
        }]))
    })
}

/// Turn a procedure result into an HTTP response.
///
/// Statuses above 399 are reported as a handler failure carrying the
/// output's message. 1xx statuses are passed through unchanged; hyper does
/// not send an informational status as a final response and answers 500.
pub fn into_response(output: RouterOutput) -> Response {
    if output.is_failure() {
        let message = output
            .message
            .unwrap_or_else(|| default_reason(output.status).to_string());
        let mut error = RpcError::http(output.status, message);
        error.details = output.data;
        return error.into_response();
    }

    let Ok(status) = StatusCode::from_u16(output.status) else {
        return RpcError::invalid_status(output.status).into_response();
    };
    let body = output.data.unwrap_or(serde_json::Value::Null);
    let mut response = (status, Json(body)).into_response();
    if let Some(message) = output.message {
        set_reason(&mut response, message);
    }
    response
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_server_error() {
            tracing::error!(error = %self, cause = ?self.cause, status = status.as_u16(), "Call failed");
        } else {
            tracing::debug!(error = %self, cause = ?self.cause, status = status.as_u16(), "Call failed");
        }

        let error = self.sanitize();
        let reason = error.message.clone();
        let mut response = (status, Json(error)).into_response();
        set_reason(&mut response, reason);
        response
    }
}

fn method_not_allowed(method: &Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        format!("No {} method was found.", method),
    )
        .into_response()
}

fn set_reason(response: &mut Response, message: String) {
    match ReasonPhrase::try_from(message.into_bytes()) {
        Ok(reason) => {
            response.extensions_mut().insert(reason);
        }
        Err(_) => tracing::trace!("Message is not a valid reason phrase; using the default"),
    }
}

fn default_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
}
