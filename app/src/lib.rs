//! Example application serving typed RPC routers over HTTP.
//!
//! Routers: `user` (`getUnique`, `getAll`), `auth` (`authenticate`) and
//! `example` (`example`), mounted under `/api` by default.

pub mod config;
pub mod rpc;

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use config::ServerConfig;
use rpc::{AppContext, app_router};

/// Build the complete application router.
pub fn build_app(config: &ServerConfig, context: Arc<AppContext>) -> axum::Router {
    typed_rpc::rpc_routes(Arc::new(app_router()), context, config.rpc.clone())
        .layer(TraceLayer::new_for_http())
}
