//! `rpc-app` - serves the example routers.
//!
//! ```sh
//! rpc-app
//! RPC_BIND=0.0.0.0:8080 RUST_LOG=debug rpc-app
//! ```
//!
//! See [`rpc_app::config::ServerConfig`] for every variable.

use std::sync::Arc;

use anyhow::Context as _;
use rpc_app::{build_app, config::ServerConfig, rpc::AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpc_app=info,typed_rpc=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let app = build_app(&config, Arc::new(AppContext::new()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        "listening on {} (prefix {})",
        config.bind_addr,
        config.rpc.api_prefix
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
