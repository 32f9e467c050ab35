//! Application context shared by every procedure

use std::sync::atomic::{AtomicU64, Ordering};

/// Application context passed to all handlers
#[derive(Debug, Default)]
pub struct AppContext {
    /// Calls that went through the logging middleware
    logged_calls: AtomicU64,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one logged call; returns the new total.
    pub fn record_call(&self) -> u64 {
        self.logged_calls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn logged_calls(&self) -> u64 {
        self.logged_calls.load(Ordering::Relaxed)
    }
}
