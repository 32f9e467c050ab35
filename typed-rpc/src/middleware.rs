//! Middleware support
//!
//! Middleware are pre-handler steps. Each receives the request context, may
//! perform side effects or checks, and either completes or fails the call.
//! They never see or transform the input or the output.

use crate::{Context, RpcResult};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a middleware step
pub type MiddlewareFuture = BoxFuture<'static, RpcResult<()>>;

/// Middleware function type
pub type MiddlewareFn<Ctx> = Arc<dyn Fn(Context<Ctx>) -> MiddlewareFuture + Send + Sync>;

/// Trait for implementing custom middleware
pub trait Middleware<Ctx: Send + Sync + 'static>: Send + Sync {
    /// Inspect the request; an `Err` aborts the call with that error
    fn handle(&self, ctx: Context<Ctx>) -> MiddlewareFuture;
}

/// Create middleware from an async function
///
/// # Example
/// ```rust,ignore
/// async fn log_cookies(ctx: Context<AppContext>) -> RpcResult<()> {
///     tracing::info!(cookies = ?ctx.cookies().get_all(), "incoming call");
///     Ok(())
/// }
///
/// let mw = from_fn(log_cookies);
/// ```
pub fn from_fn<Ctx, F, Fut>(f: F) -> MiddlewareFn<Ctx>
where
    Ctx: Send + Sync + 'static,
    F: Fn(Context<Ctx>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RpcResult<()>> + Send + 'static,
{
    Arc::new(move |ctx: Context<Ctx>| -> MiddlewareFuture { Box::pin(f(ctx)) })
}

/// Wrap a [`Middleware`] implementation
pub fn from_middleware<Ctx, M>(middleware: M) -> MiddlewareFn<Ctx>
where
    Ctx: Send + Sync + 'static,
    M: Middleware<Ctx> + 'static,
{
    let middleware = Arc::new(middleware);
    Arc::new(move |ctx: Context<Ctx>| middleware.handle(ctx))
}

/// Run middleware strictly in order, each awaited before the next starts.
///
/// Stops at the first failure and returns its error unchanged.
pub(crate) async fn run_chain<Ctx>(chain: &[MiddlewareFn<Ctx>], ctx: &Context<Ctx>) -> RpcResult<()>
where
    Ctx: Send + Sync + 'static,
{
    for (index, middleware) in chain.iter().enumerate() {
        if let Err(error) = middleware(ctx.clone()).await {
            tracing::debug!(
                request_id = %ctx.request_id(),
                index = index,
                code = %error.code,
                "Middleware aborted the call"
            );
            return Err(error);
        }
    }
    Ok(())
}
