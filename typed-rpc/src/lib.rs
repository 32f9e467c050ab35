//! Typed RPC
//!
//! Type-safe procedures, routers and a client over JSON/HTTP.
//!
//! # Overview
//!
//! A backend declares procedures with a chained builder, groups them into
//! named routers and mounts the result on an axum server. Each procedure has
//! an HTTP method, an input contract, an optional output contract, a list of
//! middleware and a handler. Clients call procedures through [`Endpoint`]
//! declarations shared with the server.
//!
//! ```rust,ignore
//! use typed_rpc::prelude::*;
//!
//! let user = Router::new().endpoint::<GetAll>(
//!     procedure::<AppContext>()
//!         .input::<NoInput>()
//!         .output::<User>()
//!         .resolve(|_ctx, _input| async move {
//!             Ok(RouterOutput::ok(User::new("123", "hanna")).with_message("OK"))
//!         }),
//! );
//!
//! let app = AppRouter::new().router("user", user);
//! let routes = rpc_routes(Arc::new(app), Arc::new(AppContext::default()), RpcConfig::default());
//! ```
//!
//! # Request lifecycle
//!
//! 1. The path is parsed (`user/getAll` or `user.getAll`) and resolved.
//! 2. The body is parsed and validated against the input contract.
//! 3. Middleware run in registration order.
//! 4. The handler runs; its status is checked and its output validated.
//! 5. `status`, `data` and `message` become the HTTP status, body and reason phrase.

pub mod client;
mod config;
mod context;
pub mod endpoint;
mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod procedure;
mod router;
mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use client::{ApiResponse, Notifier, RequestOptions, RpcClient, TracingNotifier};
pub use config::{ConfigValidationError, RpcConfig};
pub use context::{Context, Cookies, EmptyContext, RequestMeta};
pub use endpoint::Endpoint;
pub use error::{RpcError, RpcErrorCode, RpcResult};
pub use handler::Handler;
pub use http::rpc_routes;
pub use middleware::{Middleware, MiddlewareFn, from_fn, from_middleware};
pub use procedure::{Procedure, ProcedureBuilder, TypedProcedure, procedure};
pub use router::{AppRouter, EndpointInfo, EndpointPath, Router};
pub use types::{HttpMethod, NoInput, RouterOutput};
pub use validation::{FieldError, Validate, ValidationResult, ValidationRules};

/// Common imports for defining procedures and routers.
pub mod prelude {
    pub use crate::{
        AppRouter, Context, Endpoint, FieldError, HttpMethod, NoInput, Router, RouterOutput,
        RpcConfig, RpcError, RpcErrorCode, RpcResult, Validate, ValidationResult,
        ValidationRules, procedure, rpc_routes,
    };
}
