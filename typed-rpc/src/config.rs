//! Configuration for the RPC transport.
//!
//! # Example
//! ```rust,ignore
//! use typed_rpc::RpcConfig;
//!
//! let config = RpcConfig::new()
//!     .with_api_prefix("/rpc")
//!     .with_max_input_size(512 * 1024)
//!     .with_expose_manifest(false);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// max_input_size must be greater than 0
    #[error("max_input_size must be greater than 0")]
    InvalidMaxInputSize,
    /// api_prefix must start with '/' and not end with one
    #[error("api_prefix must start with '/' and must not end with '/' (got '{0}')")]
    InvalidApiPrefix(String),
}

/// Transport configuration for customizing RPC behavior.
///
/// All fields have defaults that work out of the box.
///
/// * `api_prefix` - Mount point of the catch-all route. Default: `/api`.
/// * `max_input_size` - Maximum request body in bytes; larger bodies are
///   rejected with `PayloadTooLarge`. Default: 1MB.
/// * `expose_manifest` - Serve the endpoint manifest on `GET {api_prefix}`.
///   Default: true.
/// * `debug_logging` - Log request inputs at debug level. Default: false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Mount point of the RPC routes (default: /api)
    pub api_prefix: String,
    /// Maximum input JSON size in bytes (default: 1MB)
    pub max_input_size: usize,
    /// Serve the endpoint manifest (default: true)
    pub expose_manifest: bool,
    /// Enable debug logging of inputs (default: false)
    pub debug_logging: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            max_input_size: 1024 * 1024, // 1MB
            expose_manifest: true,
            debug_logging: false,
        }
    }
}

impl RpcConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mount point of the RPC routes.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the maximum input size in bytes.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Enable or disable the manifest route.
    pub fn with_expose_manifest(mut self, enabled: bool) -> Self {
        self.expose_manifest = enabled;
        self
    }

    /// Enable or disable debug logging.
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Check the configuration for values the transport cannot work with.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_input_size == 0 {
            return Err(ConfigValidationError::InvalidMaxInputSize);
        }
        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(ConfigValidationError::InvalidApiPrefix(
                self.api_prefix.clone(),
            ));
        }
        Ok(())
    }
}
