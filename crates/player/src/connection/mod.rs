//! Engine connection: port trait, correlation core, and the desktop client

mod client;
mod core;
mod port;

pub use client::{ConnectError, EngineClient};
pub use core::{BackoffState, PendingRequests};
pub use port::{request_timeout_ms, GameConnectionPort, DEFAULT_REQUEST_TIMEOUT_MS};

#[cfg(any(test, feature = "testing"))]
pub use port::MockGameConnectionPort;
