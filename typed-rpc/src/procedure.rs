//! Procedure Builder API
//!
//! A procedure is configured through a chain of typestate builders:
//!
//! ```text
//! procedure() ──input::<I>()──▶ InputProcedureBuilder ──output::<O>()──▶ OutputProcedureBuilder
//!      │                              │                                        │
//!  use_middleware                use_middleware                          use_middleware
//!                                     └──────────── resolve(handler) ──────────┘
//!                                                         │
//!                                                         ▼
//!                                               TypedProcedure<Ctx, I, O>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use typed_rpc::prelude::*;
//!
//! let logged = procedure::<AppContext>().use_middleware(log_cookies);
//!
//! let example = logged
//!     .input::<ExampleInput>()
//!     .output::<ExampleOutput>()
//!     .resolve(|_ctx, input: ExampleInput| async move {
//!         Ok(RouterOutput::ok(ExampleOutput { id: input.id, name: "hanna".into() })
//!             .with_message("OK"))
//!     });
//! ```
//!
//! The resolved procedure, when called with a raw JSON input:
//!
//! 1. deserializes and validates the input (`BadInput` on failure; nothing else runs),
//! 2. runs every middleware in registration order, stopping at the first error,
//! 3. awaits the handler,
//! 4. rejects statuses outside [100, 599] (`InvalidStatus`),
//! 5. validates the result against the output contract when one was declared (`BadOutput`).

use crate::handler::Handler;
use crate::middleware::{MiddlewareFn, from_fn, run_chain};
use crate::validation::{Validate, ValidationResult};
use crate::{Context, HttpMethod, RouterOutput, RpcError, RpcResult};
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Future returned by a type-erased procedure.
pub type ProcedureFuture = BoxFuture<'static, RpcResult<RouterOutput>>;

/// Type-erased callable: validated input in, validated output out.
pub type BoxedProcedureFn<Ctx> =
    Arc<dyn Fn(Context<Ctx>, serde_json::Value) -> ProcedureFuture + Send + Sync>;

/// A resolved procedure as stored in a router.
pub struct Procedure<Ctx: Send + Sync + 'static> {
    method: HttpMethod,
    input_type: &'static str,
    output_type: Option<&'static str>,
    middleware_len: usize,
    call: BoxedProcedureFn<Ctx>,
}

impl<Ctx: Send + Sync + 'static> Clone for Procedure<Ctx> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            input_type: self.input_type,
            output_type: self.output_type,
            middleware_len: self.middleware_len,
            call: self.call.clone(),
        }
    }
}

impl<Ctx: Send + Sync + 'static> Procedure<Ctx> {
    /// HTTP method the procedure answers to.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Rust type name of the input contract.
    pub fn input_type(&self) -> &'static str {
        self.input_type
    }

    /// Rust type name of the output contract, if one was declared.
    pub fn output_type(&self) -> Option<&'static str> {
        self.output_type
    }

    /// Number of middleware steps in front of the handler.
    pub fn middleware_len(&self) -> usize {
        self.middleware_len
    }

    pub(crate) fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Run the procedure against a raw JSON input.
    pub async fn call(&self, ctx: Context<Ctx>, input: serde_json::Value) -> RpcResult<RouterOutput> {
        (self.call)(ctx, input).await
    }
}

impl<Ctx: Send + Sync + 'static> std::fmt::Debug for Procedure<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("method", &self.method)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("middleware_len", &self.middleware_len)
            .finish()
    }
}

/// A resolved procedure that still remembers its input and output types.
///
/// Routers accept it wherever a [`Procedure`] is expected; the types only
/// matter for [`crate::Router::endpoint`], which checks them against an
/// [`crate::Endpoint`] declaration.
pub struct TypedProcedure<Ctx: Send + Sync + 'static, I, O> {
    inner: Procedure<Ctx>,
    _types: PhantomData<fn(I) -> O>,
}

impl<Ctx: Send + Sync + 'static, I, O> TypedProcedure<Ctx, I, O> {
    /// Override the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.inner = self.inner.with_method(method);
        self
    }

    /// Drop the type information.
    pub fn into_procedure(self) -> Procedure<Ctx> {
        self.inner
    }

    /// Borrow the erased procedure.
    pub fn as_procedure(&self) -> &Procedure<Ctx> {
        &self.inner
    }
}

impl<Ctx: Send + Sync + 'static, I, O> From<TypedProcedure<Ctx, I, O>> for Procedure<Ctx> {
    fn from(procedure: TypedProcedure<Ctx, I, O>) -> Self {
        procedure.inner
    }
}

/// Start a procedure chain.
pub fn procedure<Ctx: Send + Sync + 'static>() -> ProcedureBuilder<Ctx> {
    ProcedureBuilder::new()
}

/// Entry point of the chain; holds middleware registered before the input.
///
/// Cloning it is cheap, so one configured builder can serve as the base for
/// many procedures.
pub struct ProcedureBuilder<Ctx: Send + Sync + 'static> {
    middleware: Vec<MiddlewareFn<Ctx>>,
    method: HttpMethod,
}

impl<Ctx: Send + Sync + 'static> Clone for ProcedureBuilder<Ctx> {
    fn clone(&self) -> Self {
        Self {
            middleware: self.middleware.clone(),
            method: self.method,
        }
    }
}

impl<Ctx: Send + Sync + 'static> Default for ProcedureBuilder<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: Send + Sync + 'static> ProcedureBuilder<Ctx> {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
            method: HttpMethod::default(),
        }
    }

    /// Append a middleware step.
    ///
    /// Middleware execute in registration order:
    ///
    /// ```rust,ignore
    /// procedure::<AppContext>()
    ///     .use_middleware(logging)      // Executes first
    ///     .use_middleware(rate_limit)   // Executes second
    /// ```
    pub fn use_middleware<F, Fut>(mut self, middleware: F) -> Self
    where
        F: Fn(Context<Ctx>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<()>> + Send + 'static,
    {
        self.middleware.push(from_fn(middleware));
        self
    }

    /// Append a middleware step already wrapped as [`MiddlewareFn`].
    pub fn use_middleware_fn(mut self, middleware: MiddlewareFn<Ctx>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Set the HTTP method (default: POST).
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the input contract.
    pub fn input<I>(self) -> InputProcedureBuilder<Ctx, I>
    where
        I: DeserializeOwned + Validate + Send + 'static,
    {
        InputProcedureBuilder {
            middleware: self.middleware,
            method: self.method,
            _phantom: PhantomData,
        }
    }
}

/// A builder with an input contract.
pub struct InputProcedureBuilder<Ctx: Send + Sync + 'static, I> {
    middleware: Vec<MiddlewareFn<Ctx>>,
    method: HttpMethod,
    _phantom: PhantomData<fn(I)>,
}

impl<Ctx, I> InputProcedureBuilder<Ctx, I>
where
    Ctx: Send + Sync + 'static,
    I: DeserializeOwned + Validate + Send + 'static,
{
    /// Append a middleware step.
    pub fn use_middleware<F, Fut>(mut self, middleware: F) -> Self
    where
        F: Fn(Context<Ctx>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<()>> + Send + 'static,
    {
        self.middleware.push(from_fn(middleware));
        self
    }

    /// Append a middleware step already wrapped as [`MiddlewareFn`].
    pub fn use_middleware_fn(mut self, middleware: MiddlewareFn<Ctx>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the output contract; the handler's result is validated against it.
    pub fn output<O>(self) -> OutputProcedureBuilder<Ctx, I, O>
    where
        O: Serialize + Validate + Send + 'static,
    {
        OutputProcedureBuilder {
            middleware: self.middleware,
            method: self.method,
            _phantom: PhantomData,
        }
    }

    /// Finish the chain; the handler's result is passed through unchecked.
    pub fn resolve<H, Fut, R>(self, handler: H) -> TypedProcedure<Ctx, I, R>
    where
        H: Fn(Context<Ctx>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<RouterOutput<R>>> + Send + 'static,
        R: Serialize + Send + 'static,
    {
        compile(self.method, self.middleware, handler, None)
    }
}

/// A builder with input and output contracts.
pub struct OutputProcedureBuilder<Ctx: Send + Sync + 'static, I, O> {
    middleware: Vec<MiddlewareFn<Ctx>>,
    method: HttpMethod,
    _phantom: PhantomData<fn(I) -> O>,
}

impl<Ctx, I, O> OutputProcedureBuilder<Ctx, I, O>
where
    Ctx: Send + Sync + 'static,
    I: DeserializeOwned + Validate + Send + 'static,
    O: Serialize + Validate + Send + 'static,
{
    /// Append a middleware step.
    pub fn use_middleware<F, Fut>(mut self, middleware: F) -> Self
    where
        F: Fn(Context<Ctx>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<()>> + Send + 'static,
    {
        self.middleware.push(from_fn(middleware));
        self
    }

    /// Append a middleware step already wrapped as [`MiddlewareFn`].
    pub fn use_middleware_fn(mut self, middleware: MiddlewareFn<Ctx>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Finish the chain; the handler's result must satisfy `O`.
    pub fn resolve<H, Fut>(self, handler: H) -> TypedProcedure<Ctx, I, O>
    where
        H: Fn(Context<Ctx>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<RouterOutput<O>>> + Send + 'static,
    {
        compile(
            self.method,
            self.middleware,
            handler,
            Some(check_output::<O> as OutputCheck<O>),
        )
    }
}

type OutputCheck<R> = fn(&RouterOutput<R>) -> ValidationResult;

fn check_output<O: Validate>(output: &RouterOutput<O>) -> ValidationResult {
    output.validate()
}

fn compile<Ctx, I, R, H>(
    method: HttpMethod,
    middleware: Vec<MiddlewareFn<Ctx>>,
    handler: H,
    output_check: Option<OutputCheck<R>>,
) -> TypedProcedure<Ctx, I, R>
where
    Ctx: Send + Sync + 'static,
    I: DeserializeOwned + Validate + Send + 'static,
    R: Serialize + Send + 'static,
    H: Handler<Ctx, I, R>,
{
    let middleware_len = middleware.len();
    let middleware: Arc<[MiddlewareFn<Ctx>]> = middleware.into();
    let handler = Arc::new(handler);

    let call: BoxedProcedureFn<Ctx> = Arc::new(move |ctx: Context<Ctx>, raw_input: serde_json::Value| -> ProcedureFuture {
        let middleware = middleware.clone();
        let handler = handler.clone();

        Box::pin(async move {
            let input: I = serde_json::from_value(raw_input).map_err(|e| {
                tracing::debug!(request_id = %ctx.request_id(), error = %e, "Input did not deserialize");
                RpcError::bad_input().with_details(serde_json::json!([{
                    "field": "",
                    "message": e.to_string(),
                    "code": "invalid_type",
                }]))
            })?;
            input.validate().into_result(RpcError::bad_input())?;

            run_chain(&middleware, &ctx).await?;

            let output = <H as Handler<Ctx, I, R>>::call(&handler, ctx, input).await?;

            if !output.has_valid_status() {
                return Err(RpcError::invalid_status(output.status));
            }
            if let Some(check) = output_check {
                check(&output).into_result(RpcError::bad_output())?;
            }

            let RouterOutput {
                status,
                data,
                message,
            } = output;
            let data = data.map(serde_json::to_value).transpose()?;
            Ok(RouterOutput {
                status,
                data,
                message,
            })
        })
    });

    TypedProcedure {
        inner: Procedure {
            method,
            input_type: std::any::type_name::<I>(),
            output_type: output_check.map(|_| std::any::type_name::<R>()),
            middleware_len,
            call,
        },
        _types: PhantomData,
    }
}
