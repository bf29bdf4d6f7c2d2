//! Tableforge Player - the non-authoritative peer as a headless library
//!
//! Pieces the embedding UI composes:
//! - [`connection`]: the engine WebSocket client with request/response
//!   correlation, timeouts, and reconnect backoff
//! - [`replica`]: the read-mostly mirror of the room snapshot with the
//!   optimistic overlay for the peer's own stat edits
//! - [`actions`]: one operation per user-visible verb, applied locally when
//!   this peer is authoritative and sent to the engine otherwise
//! - [`images`]: chunked image fetch with bounded parallelism and retries

pub mod actions;
pub mod connection;
pub mod images;
pub mod replica;

pub use actions::{ActionError, ApplyOutcome, Authority, GameActions, LocalSession};
pub use connection::{ConnectError, EngineClient, GameConnectionPort};
pub use images::{fetch_image, ImageFetchError};
pub use replica::{PendingStatEdit, Replica};
