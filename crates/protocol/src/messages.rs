//! WebSocket message types for Engine-Player communication
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing or renaming variants is a breaking change
//! - Unknown enum variants deserialize to `Unknown` for forward compatibility

use serde::{Deserialize, Serialize};

use tableforge_domain::{
    ActorKey, GameState, ItemId, PlayerId, RoomId, TransferId,
};

use crate::requests::RequestPayload;
use crate::responses::{ConnectedUser, JoinError, ResponseResult, RoomRole};

// =============================================================================
// Client Messages (Player → Engine)
// =============================================================================

/// Messages from client (Player) to server (Engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join a room as DM or player
    JoinRoom {
        room_id: RoomId,
        player_id: PlayerId,
        #[serde(default)]
        display_name: Option<String>,
        role: RoomRole,
    },
    /// Leave the current room
    LeaveRoom,
    /// Send a request (mutations, saves, image chunks)
    Request {
        /// Unique request ID for correlation
        request_id: String,
        payload: RequestPayload,
    },
    /// Heartbeat ping
    Heartbeat,
    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (Engine → Player)
// =============================================================================

/// Messages from server (Engine) to client (Player)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Join succeeded; carries the current snapshot and peer list
    RoomJoined {
        room_id: RoomId,
        role: RoomRole,
        state: GameState,
        users: Vec<ConnectedUser>,
    },
    /// Join failed
    JoinRejected { reason: JoinError },
    /// Response to a Request message
    Response {
        /// Correlated request ID
        request_id: String,
        result: ResponseResult,
    },
    /// Full-state broadcast after every applied mutation
    ///
    /// Replicas replace their copy wholesale; `state.seq` lets them discard
    /// stale broadcasts deterministically.
    StateSync { state: GameState },
    /// A pending transfer awaits this peer's confirmation (sent only to the
    /// recipient's owning peer, never broadcast)
    TransferOffered {
        transfer_id: TransferId,
        item_id: ItemId,
        from: ActorKey,
        to: ActorKey,
        slot_index: usize,
    },
    /// A pending transfer was settled
    TransferResolved {
        transfer_id: TransferId,
        outcome: TransferOutcome,
    },
    /// A peer joined the room
    UserJoined { user: ConnectedUser },
    /// A peer left the room
    UserLeft { player_id: PlayerId },
    /// Heartbeat reply
    Pong,
    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

/// How a pending transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferOutcome {
    Accepted,
    Rejected,
    /// Withdrawn by the sender; the recipient is notified so their prompt
    /// can be dismissed
    Cancelled,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_client_message_round_trip() {
        let msg = ClientMessage::JoinRoom {
            room_id: RoomId::new(),
            player_id: PlayerId::new(),
            display_name: Some("Ash".into()),
            role: RoomRole::Player,
        };
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: ClientMessage = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(back, ClientMessage::JoinRoom { .. }));
    }

    #[test]
    fn test_unknown_server_message_is_forward_compatible() {
        let json = r#"{"type":"SomeFutureMessage","payload":1}"#;
        let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(msg, ServerMessage::Unknown));
    }

    #[test]
    fn test_state_sync_round_trip() {
        let msg = ServerMessage::StateSync {
            state: GameState::new(Utc::now()),
        };
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: ServerMessage = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(back, ServerMessage::StateSync { .. }));
    }
}
