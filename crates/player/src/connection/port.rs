//! Engine connection port
//!
//! The request methods use `async_trait` instead of returning
//! `Pin<Box<dyn Future>>` for better mockall compatibility.

use async_trait::async_trait;

use tableforge_protocol::{RequestError, RequestPayload, ResponseResult};

/// Default timeout for request/response round trips, overridable via
/// `TABLEFORGE_REQUEST_TIMEOUT_MS`.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Resolve the request timeout from the environment.
pub fn request_timeout_ms() -> u64 {
    std::env::var("TABLEFORGE_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)
}

/// Port for request-response operations against the engine
///
/// The implementation handles request_id generation, pending-request
/// tracking, and response correlation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GameConnectionPort: Send + Sync {
    /// Send a request and await the correlated response.
    async fn request(&self, payload: RequestPayload) -> Result<ResponseResult, RequestError>;

    /// Send a request with a custom timeout in milliseconds.
    async fn request_with_timeout(
        &self,
        payload: RequestPayload,
        timeout_ms: u64,
    ) -> Result<ResponseResult, RequestError>;
}
