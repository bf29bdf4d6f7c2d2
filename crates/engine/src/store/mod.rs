//! Room persistence
//!
//! One JSON document per room id under the data directory. The snapshot is
//! written after every applied mutation, so a crashed engine resumes from
//! the last broadcast state.

mod fs_store;

pub use fs_store::FsRoomStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tableforge_domain::{GameState, PlayerId, RoomId};

/// The persisted layout of one room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoom {
    pub game_state: GameState,
    pub last_modified: DateTime<Utc>,
    pub room_creator: PlayerId,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Port for room persistence
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn save(&self, room_id: RoomId, room: &SavedRoom) -> Result<(), StoreError>;
    async fn load(&self, room_id: RoomId) -> Result<Option<SavedRoom>, StoreError>;
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: dashmap::DashMap<RoomId, SavedRoom>,
}

#[cfg(test)]
impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn save(&self, room_id: RoomId, room: &SavedRoom) -> Result<(), StoreError> {
        self.rooms.insert(room_id, room.clone());
        Ok(())
    }

    async fn load(&self, room_id: RoomId) -> Result<Option<SavedRoom>, StoreError> {
        Ok(self.rooms.get(&room_id).map(|r| r.clone()))
    }
}
