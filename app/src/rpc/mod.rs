//! App RPC - Routers, Types, Endpoints and Context

mod context;
pub mod endpoints;
mod handlers;
mod types;

pub use context::*;
pub use handlers::*;
pub use types::*;
