//! Connection management for WebSocket clients
//!
//! Tracks connected peers, their room association, and the per-connection
//! send channel. Doubles as the `Broadcaster` the session service pushes
//! state syncs through.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use tableforge_domain::{PlayerId, RoomId};
use tableforge_protocol::{RoomRole, ServerMessage};

use crate::session::Broadcaster;

/// Information about a connected peer.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: Uuid,
    pub player_id: PlayerId,
    pub display_name: Option<String>,
    /// The room this connection has joined (if any)
    pub room_id: Option<RoomId>,
    pub role: RoomRole,
}

impl ConnectionInfo {
    pub fn is_dm(&self) -> bool {
        self.role.is_dm()
    }
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    connections: DashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection before it joins a room.
    pub fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            // Placeholder until JoinRoom announces the peer identity.
            player_id: PlayerId::new(),
            display_name: None,
            room_id: None,
            role: RoomRole::Player,
        };
        self.connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Remove a connection, returning its last known info.
    pub fn unregister(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let removed = self.connections.remove(&connection_id).map(|(_, (info, _))| info);
        if removed.is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    pub fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        self.connections.get(&connection_id).map(|e| e.0.clone())
    }

    /// Update a connection's info in place.
    pub fn update<F>(&self, connection_id: Uuid, f: F)
    where
        F: FnOnce(&mut ConnectionInfo),
    {
        if let Some(mut entry) = self.connections.get_mut(&connection_id) {
            f(&mut entry.0);
        }
    }

    /// Whether a DM connection is already attached to the room.
    pub fn dm_connected(&self, room_id: RoomId) -> bool {
        self.connections
            .iter()
            .any(|e| e.0.room_id == Some(room_id) && e.0.is_dm())
    }

    /// All peers currently joined to a room.
    pub fn peers_in_room(&self, room_id: RoomId) -> Vec<ConnectionInfo> {
        self.connections
            .iter()
            .filter(|e| e.0.room_id == Some(room_id))
            .map(|e| e.0.clone())
            .collect()
    }

}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for ConnectionManager {
    async fn broadcast(&self, room_id: RoomId, message: ServerMessage) {
        let targets: Vec<(Uuid, mpsc::Sender<ServerMessage>)> = self
            .connections
            .iter()
            .filter(|e| e.0.room_id == Some(room_id))
            .map(|e| (e.0.connection_id, e.1.clone()))
            .collect();
        for (connection_id, sender) in targets {
            if sender.send(message.clone()).await.is_err() {
                tracing::debug!(connection_id = %connection_id, "Broadcast to closed connection dropped");
            }
        }
    }

    async fn send_to_player(&self, room_id: RoomId, player_id: PlayerId, message: ServerMessage) {
        let targets: Vec<mpsc::Sender<ServerMessage>> = self
            .connections
            .iter()
            .filter(|e| e.0.room_id == Some(room_id) && e.0.player_id == player_id)
            .map(|e| e.1.clone())
            .collect();
        for sender in targets {
            if sender.send(message.clone()).await.is_err() {
                tracing::debug!(player_id = %player_id, "Send to closed connection dropped");
            }
        }
    }
}
