//! Compile-time endpoint declarations
//!
//! An [`Endpoint`] ties a dotted path to its HTTP method and its input and
//! output types. The server registers procedures through it
//! ([`crate::Router::endpoint`]) and the client calls through it
//! ([`crate::client::RpcClient::call`]), so both sides agree on the types of
//! every path without repeating them.
//!
//! # Example
//! ```rust,ignore
//! pub struct GetAll;
//!
//! impl Endpoint for GetAll {
//!     const PATH: &'static str = "user.getAll";
//!     const METHOD: HttpMethod = HttpMethod::Get;
//!     type Input = NoInput;
//!     type Output = User;
//! }
//! ```

use crate::HttpMethod;
use crate::validation::Validate;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A single callable path and its types.
pub trait Endpoint: Send + Sync + 'static {
    /// Dotted path, e.g. `user.getAll`
    const PATH: &'static str;
    /// HTTP method the procedure is bound to
    const METHOD: HttpMethod;
    /// Request payload
    type Input: Serialize + DeserializeOwned + Validate + Send + 'static;
    /// `data` of a successful response
    type Output: Serialize + DeserializeOwned + Send + 'static;

    /// Last segment of [`Self::PATH`], the name inside its router.
    fn name() -> &'static str {
        Self::PATH
            .rsplit(['.', '/'])
            .next()
            .unwrap_or(Self::PATH)
    }

    /// Path with `/` separators, as used in request URLs.
    fn url_path() -> String {
        Self::PATH.replace('.', "/")
    }
}
