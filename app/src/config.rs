//! Server configuration, populated from environment variables.

use std::net::SocketAddr;

use anyhow::Context as _;
use typed_rpc::RpcConfig;

/// Runtime configuration for the RPC server.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `RPC_BIND` | `127.0.0.1:3000` | TCP socket address to listen on |
/// | `RPC_API_PREFIX` | `/api` | Mount point of the RPC routes |
/// | `RPC_MAX_INPUT_SIZE` | `1048576` | Largest accepted request body, in bytes |
/// | `RPC_EXPOSE_MANIFEST` | `true` | Serve the endpoint list on `GET {prefix}` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,
    /// Transport settings handed to `typed_rpc::rpc_routes`.
    pub rpc: RpcConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            rpc: RpcConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("RPC_BIND") {
            Some(value) => value
                .parse::<SocketAddr>()
                .with_context(|| format!("RPC_BIND must be a socket address (got '{value}')"))?,
            None => defaults.bind_addr,
        };

        let mut rpc = defaults.rpc;
        if let Some(prefix) = lookup("RPC_API_PREFIX") {
            rpc = rpc.with_api_prefix(prefix);
        }
        if let Some(value) = lookup("RPC_MAX_INPUT_SIZE") {
            let size = value
                .parse::<usize>()
                .with_context(|| format!("RPC_MAX_INPUT_SIZE must be a byte count (got '{value}')"))?;
            rpc = rpc.with_max_input_size(size);
        }
        if let Some(value) = lookup("RPC_EXPOSE_MANIFEST") {
            let enabled = value
                .parse::<bool>()
                .with_context(|| format!("RPC_EXPOSE_MANIFEST must be true or false (got '{value}')"))?;
            rpc = rpc.with_expose_manifest(enabled);
        }
        rpc.validate().context("invalid RPC configuration")?;

        Ok(Self { bind_addr, rpc })
    }
}
