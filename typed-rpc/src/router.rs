//! Router implementation with builder pattern
//!
//! A [`Router`] maps names to procedures or nested routers. An [`AppRouter`]
//! is the root: it maps router names to routers and resolves dotted paths
//! such as `user.getAll` back to a single procedure.
//!
//! # Example
//! ```rust,ignore
//! let user = Router::new()
//!     .get("getUnique", get_unique)
//!     .get("getAll", get_all);
//!
//! let app = AppRouter::new()
//!     .router("user", user)
//!     .router("auth", auth_router());
//!
//! assert_eq!(app.endpoints(), vec!["auth.authenticate", "user.getAll", "user.getUnique"]);
//! ```

use crate::endpoint::Endpoint;
use crate::procedure::{Procedure, TypedProcedure};
use crate::validation::{validate_path, validate_segment};
use crate::{Context, HttpMethod, RouterOutput, RpcError, RpcResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A node of the registry tree.
enum Node<Ctx: Send + Sync + 'static> {
    Procedure(Procedure<Ctx>),
    Router(Router<Ctx>),
}

/// Named procedures and nested routers.
pub struct Router<Ctx: Send + Sync + 'static> {
    nodes: HashMap<String, Node<Ctx>>,
}

impl<Ctx: Send + Sync + 'static> Default for Router<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: Send + Sync + 'static> Router<Ctx> {
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Entries whose name is not a single path segment are skipped with a
    /// warning.
    fn insert(mut self, name: String, node: Node<Ctx>) -> Self {
        if let Err(error) = validate_segment(&name) {
            tracing::warn!(name = %name, cause = ?error.cause, "Skipping router entry with invalid name");
            return self;
        }
        if self.nodes.insert(name.clone(), node).is_some() {
            tracing::warn!(name = %name, "Replacing existing router entry");
        } else {
            tracing::trace!(name = %name, "Registered router entry");
        }
        self
    }

    /// Register a procedure under `name` with the method it was built with.
    pub fn procedure(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.insert(name.into(), Node::Procedure(procedure.into()))
    }

    /// Register a procedure under `name`, overriding its method.
    pub fn route(
        self,
        name: impl Into<String>,
        method: HttpMethod,
        procedure: impl Into<Procedure<Ctx>>,
    ) -> Self {
        let procedure: Procedure<Ctx> = procedure.into();
        self.procedure(name, procedure.with_method(method))
    }

    /// Register a GET procedure
    pub fn get(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.route(name, HttpMethod::Get, procedure)
    }

    /// Register a POST procedure
    pub fn post(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.route(name, HttpMethod::Post, procedure)
    }

    /// Register a PUT procedure
    pub fn put(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.route(name, HttpMethod::Put, procedure)
    }

    /// Register a PATCH procedure
    pub fn patch(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.route(name, HttpMethod::Patch, procedure)
    }

    /// Register a DELETE procedure
    pub fn delete(self, name: impl Into<String>, procedure: impl Into<Procedure<Ctx>>) -> Self {
        self.route(name, HttpMethod::Delete, procedure)
    }

    /// Register a procedure for a declared [`Endpoint`].
    ///
    /// The procedure's input and output types must be the endpoint's; it is
    /// stored under the last segment of `E::PATH` with `E::METHOD`.
    ///
    /// ```rust,ignore
    /// Router::new().endpoint::<GetAll>(
    ///     procedure().input::<NoInput>().output::<User>().resolve(get_all),
    /// );
    /// ```
    pub fn endpoint<E: Endpoint>(self, procedure: TypedProcedure<Ctx, E::Input, E::Output>) -> Self {
        self.route(E::name(), E::METHOD, procedure)
    }

    /// Nest another router under `name`.
    pub fn nest(self, name: impl Into<String>, router: Router<Ctx>) -> Self {
        self.insert(name.into(), Node::Router(router))
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn collect(&self, prefix: &str, out: &mut Vec<EndpointInfo>) {
        for (name, node) in &self.nodes {
            let path = format!("{}.{}", prefix, name);
            match node {
                Node::Procedure(procedure) => out.push(EndpointInfo {
                    path,
                    method: procedure.method(),
                    input: procedure.input_type().to_string(),
                    output: procedure.output_type().map(str::to_string),
                    middleware: procedure.middleware_len(),
                }),
                Node::Router(router) => router.collect(&path, out),
            }
        }
    }
}

/// The root registry: router name to router.
///
/// Built once at startup and shared read-only behind an `Arc`.
pub struct AppRouter<Ctx: Send + Sync + 'static> {
    routers: HashMap<String, Router<Ctx>>,
}

impl<Ctx: Send + Sync + 'static> Default for AppRouter<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: Send + Sync + 'static> AppRouter<Ctx> {
    pub fn new() -> Self {
        Self {
            routers: HashMap::new(),
        }
    }

    /// Add a named router. A name that is not a single path segment is
    /// skipped with a warning.
    pub fn router(mut self, name: impl Into<String>, router: Router<Ctx>) -> Self {
        let name = name.into();
        if let Err(error) = validate_segment(&name) {
            tracing::warn!(name = %name, cause = ?error.cause, "Skipping router with invalid name");
            return self;
        }
        if self.routers.insert(name.clone(), router).is_some() {
            tracing::warn!(name = %name, "Replacing existing router");
        }
        self
    }

    /// Every procedure path in dotted form, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        self.manifest().into_iter().map(|info| info.path).collect()
    }

    /// Description of every procedure, sorted by path.
    pub fn manifest(&self) -> Vec<EndpointInfo> {
        let mut out = Vec::new();
        for (name, router) in &self.routers {
            router.collect(name, &mut out);
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    /// Walk the registry to the procedure a path names.
    ///
    /// Missing or procedure-typed intermediate segments are a bad endpoint;
    /// a missing final procedure is not found.
    pub fn resolve(&self, path: &EndpointPath) -> RpcResult<&Procedure<Ctx>> {
        let (last, intermediate) = path
            .segments()
            .split_last()
            .ok_or_else(RpcError::bad_endpoint)?;
        let (root, nested) = intermediate
            .split_first()
            .ok_or_else(RpcError::bad_endpoint)?;

        let mut router = self.routers.get(root).ok_or_else(|| {
            RpcError::bad_endpoint().with_cause(format!("no router named '{}'", root))
        })?;
        for segment in nested {
            router = match router.nodes.get(segment) {
                Some(Node::Router(next)) => next,
                _ => {
                    return Err(RpcError::bad_endpoint()
                        .with_cause(format!("no router named '{}' in '{}'", segment, path)));
                }
            };
        }

        match router.nodes.get(last) {
            Some(Node::Procedure(procedure)) => Ok(procedure),
            _ => Err(RpcError::endpoint_not_found().with_cause(format!("no procedure at '{}'", path))),
        }
    }

    /// Resolve `path` and run its procedure with `input`.
    ///
    /// A procedure bound to another method is reported as not found.
    pub async fn dispatch(
        &self,
        ctx: Context<Ctx>,
        path: &str,
        method: HttpMethod,
        input: serde_json::Value,
    ) -> RpcResult<RouterOutput> {
        let path = EndpointPath::parse(path)?;
        let procedure = self.resolve(&path)?;

        if procedure.method() != method {
            tracing::debug!(
                path = %path,
                expected = %procedure.method(),
                got = %method,
                "Method does not match procedure"
            );
            return Err(RpcError::endpoint_not_found()
                .with_cause(format!("'{}' does not accept {}", path, method)));
        }

        tracing::debug!(request_id = %ctx.request_id(), path = %path, "Dispatching procedure");
        procedure.call(ctx, input).await
    }
}

/// A parsed endpoint path: two or more non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointPath {
    segments: Vec<String>,
}

impl EndpointPath {
    /// Parse a dot- or slash-delimited path.
    pub fn parse(path: &str) -> RpcResult<Self> {
        validate_path(path)?;
        Ok(Self {
            segments: path.split(['.', '/']).map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `user.getAll`
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// `user/getAll`
    pub fn slashed(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Manifest entry for one procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: HttpMethod,
    /// Rust type name of the input contract
    pub input: String,
    /// Rust type name of the output contract, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Number of middleware steps
    pub middleware: usize,
}
