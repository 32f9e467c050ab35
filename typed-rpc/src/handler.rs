//! Handler traits

use crate::{Context, RouterOutput, RpcResult};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

/// Trait for handler functions
///
/// Automatically implemented for async functions with the signature:
/// `async fn(Context<Ctx>, Input) -> RpcResult<RouterOutput<Output>>`
pub trait Handler<Ctx, Input, Output>: Send + Sync + 'static
where
    Ctx: Send + Sync + 'static,
    Input: DeserializeOwned + Send + 'static,
    Output: Serialize + Send + 'static,
{
    /// The future type returned by the handler
    type Future: Future<Output = RpcResult<RouterOutput<Output>>> + Send + 'static;

    /// Call the handler with context and validated input
    fn call(&self, ctx: Context<Ctx>, input: Input) -> Self::Future;
}

impl<Ctx, Input, Output, F, Fut> Handler<Ctx, Input, Output> for F
where
    Ctx: Send + Sync + 'static,
    Input: DeserializeOwned + Send + 'static,
    Output: Serialize + Send + 'static,
    F: Fn(Context<Ctx>, Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RpcResult<RouterOutput<Output>>> + Send + 'static,
{
    type Future = Fut;

    fn call(&self, ctx: Context<Ctx>, input: Input) -> Self::Future {
        (self)(ctx, input)
    }
}
