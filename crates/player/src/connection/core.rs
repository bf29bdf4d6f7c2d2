//! Platform-agnostic core logic for the engine WebSocket client
//!
//! Deliberately free of runtime dependencies: the client owns the actual
//! socket and calls into this core for pending-request tracking and
//! reconnection backoff math.

use std::collections::HashMap;

use tableforge_protocol::ResponseResult;

/// Initial delay before the first reconnect attempt.
pub(super) const INITIAL_RETRY_DELAY_MS: u64 = 500;
/// Upper bound for the reconnect delay.
pub(super) const MAX_RETRY_DELAY_MS: u64 = 30_000;
/// Growth factor between attempts.
pub(super) const BACKOFF_MULTIPLIER: f64 = 2.0;
/// Give up after this many reconnect attempts.
pub(super) const MAX_RETRY_ATTEMPTS: u32 = 8;

pub type PendingCallback = Box<dyn FnOnce(ResponseResult) + Send + 'static>;

/// Tracks pending request callbacks keyed by request_id.
#[derive(Default)]
pub struct PendingRequests {
    inner: HashMap<String, PendingCallback>,
}

impl PendingRequests {
    /// Insert a pending request callback.
    pub fn insert(&mut self, request_id: String, callback: PendingCallback) {
        self.inner.insert(request_id, callback);
    }

    pub fn remove(&mut self, request_id: &str) -> bool {
        self.inner.remove(request_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Resolve and remove a pending request.
    ///
    /// Returns true if a pending request was found.
    pub fn resolve(&mut self, request_id: &str, result: ResponseResult) -> bool {
        if let Some(callback) = self.inner.remove(request_id) {
            callback(result);
            true
        } else {
            false
        }
    }

    /// Drop every pending request (connection lost). Callbacks are simply
    /// discarded; awaiting callers observe a cancelled channel.
    pub fn clear(&mut self) -> usize {
        let count = self.inner.len();
        self.inner.clear();
        count
    }
}

/// Exponential backoff state shared by reconnect logic.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    attempts: u32,
    delay_ms: u64,
}

impl Default for BackoffState {
    fn default() -> Self {
        Self {
            attempts: 0,
            delay_ms: INITIAL_RETRY_DELAY_MS,
        }
    }
}

impl BackoffState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_RETRY_ATTEMPTS
    }

    /// Advance to the next attempt, updating the delay for the subsequent
    /// attempt. Returns the delay to wait *before* performing this attempt.
    pub fn next_delay_and_advance(&mut self) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }
        let current_delay = self.delay_ms;
        self.attempts += 1;
        self.delay_ms =
            ((self.delay_ms as f64) * BACKOFF_MULTIPLIER).min(MAX_RETRY_DELAY_MS as f64) as u64;
        Some(current_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_invokes_callback_once() {
        let mut pending = PendingRequests::default();
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let hits_clone = hits.clone();
        pending.insert(
            "req-1".into(),
            Box::new(move |_| {
                hits_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }),
        );

        assert!(pending.resolve("req-1", ResponseResult::success_empty()));
        assert!(!pending.resolve("req-1", ResponseResult::success_empty()));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_reports_dropped_count() {
        let mut pending = PendingRequests::default();
        pending.insert("a".into(), Box::new(|_| {}));
        pending.insert("b".into(), Box::new(|_| {}));
        assert_eq!(pending.clear(), 2);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_backoff_grows_and_exhausts() {
        let mut backoff = BackoffState::default();
        let first = backoff.next_delay_and_advance().expect("first attempt");
        let second = backoff.next_delay_and_advance().expect("second attempt");
        assert_eq!(first, INITIAL_RETRY_DELAY_MS);
        assert_eq!(second, INITIAL_RETRY_DELAY_MS * 2);

        while backoff.next_delay_and_advance().is_some() {}
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.attempts(), MAX_RETRY_ATTEMPTS);
    }
}
