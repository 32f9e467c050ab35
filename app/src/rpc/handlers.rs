//! RPC Handlers
//!
//! Define your handlers here and register them in `app_router()`.

use typed_rpc::{AppRouter, Context, NoInput, Router, RouterOutput, RpcResult, procedure};

use super::endpoints::*;
use super::*;

// =============================================================================
// Middleware
// =============================================================================

/// Logging middleware - logs the cookies of every call it guards
pub async fn log_cookies(ctx: Context<AppContext>) -> RpcResult<()> {
    let total = ctx.record_call();
    tracing::info!(
        request_id = %ctx.request_id(),
        endpoint = %ctx.meta().endpoint,
        cookies = ?ctx.cookies().get_all(),
        total = total,
        "→ call"
    );
    Ok(())
}

// =============================================================================
// Router
// =============================================================================

/// Create the application router
pub fn app_router() -> AppRouter<AppContext> {
    AppRouter::new()
        .router("user", user_router())
        .router("auth", auth_router())
        .router("example", example_router())
}

/// User sub-router
fn user_router() -> Router<AppContext> {
    Router::new()
        .endpoint::<UserGetUnique>(
            procedure()
                .input::<UserGetInput>()
                .output::<UserData>()
                .resolve(get_unique),
        )
        .endpoint::<UserGetAll>(
            procedure()
                .input::<NoInput>()
                .output::<UserData>()
                .resolve(get_all),
        )
}

/// Auth sub-router
fn auth_router() -> Router<AppContext> {
    Router::new().endpoint::<AuthAuthenticate>(
        procedure()
            .input::<AuthenticateInput>()
            .output::<AuthenticateData>()
            .resolve(authenticate),
    )
}

/// Example sub-router; every procedure here goes through `log_cookies`
fn example_router() -> Router<AppContext> {
    let logged = procedure::<AppContext>().use_middleware(log_cookies);

    Router::new().endpoint::<ExampleExample>(
        logged
            .input::<ExampleInput>()
            .output::<ExampleData>()
            .resolve(example),
    )
}

// =============================================================================
// User Handlers
// =============================================================================

async fn get_unique(
    _ctx: Context<AppContext>,
    _input: UserGetInput,
) -> RpcResult<RouterOutput<UserData>> {
    Ok(RouterOutput::ok(UserData::new("123", "Billy")))
}

async fn get_all(_ctx: Context<AppContext>, _input: NoInput) -> RpcResult<RouterOutput<UserData>> {
    Ok(RouterOutput::ok(UserData::new("123", "hanna")).with_message("OK"))
}

// =============================================================================
// Auth Handlers
// =============================================================================

// Stub: every well-formed email is accepted.
async fn authenticate(
    _ctx: Context<AppContext>,
    _input: AuthenticateInput,
) -> RpcResult<RouterOutput<AuthenticateData>> {
    Ok(RouterOutput::ok(AuthenticateData { authenticated: true }))
}

// =============================================================================
// Example Handlers
// =============================================================================

async fn example(ctx: Context<AppContext>, input: ExampleInput) -> RpcResult<RouterOutput<ExampleData>> {
    tracing::debug!(endpoint = %ctx.meta().endpoint, query = ?ctx.meta().query, "example called");
    Ok(RouterOutput::ok(ExampleData::new(input.id, "hanna")).with_message("OK"))
}
