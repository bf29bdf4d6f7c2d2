//! Filesystem-backed room store

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use tableforge_domain::RoomId;

use super::{RoomStore, SavedRoom, StoreError};

/// One JSON file per room under a data directory.
///
/// Writes go through a temp file plus rename so a crash mid-write never
/// leaves a truncated save behind.
pub struct FsRoomStore {
    dir: PathBuf,
}

impl FsRoomStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, room_id: RoomId) -> PathBuf {
        self.dir.join(format!("{room_id}.json"))
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

#[async_trait]
impl RoomStore for FsRoomStore {
    async fn save(&self, room_id: RoomId, room: &SavedRoom) -> Result<(), StoreError> {
        self.ensure_dir().await?;
        let path = self.path_for(room_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(room)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(room_id = %room_id, path = %path.display(), "Room saved");
        Ok(())
    }

    async fn load(&self, room_id: RoomId) -> Result<Option<SavedRoom>, StoreError> {
        let path = self.path_for(room_id);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tableforge_domain::{Character, GameState, PlayerId};

    fn saved_room() -> SavedRoom {
        let mut state = GameState::new(Utc::now());
        state.party.push(Character::new("Ash", 10, 5, 5));
        SavedRoom {
            game_state: state,
            last_modified: Utc::now(),
            room_creator: PlayerId::new(),
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsRoomStore::new(dir.path());
        let room_id = RoomId::new();
        let saved = saved_room();

        store.save(room_id, &saved).await.expect("save");
        let loaded = store.load(room_id).await.expect("load").expect("present");
        assert_eq!(loaded.game_state.party.len(), 1);
        assert_eq!(loaded.game_state.party[0].name, "Ash");
    }

    #[tokio::test]
    async fn test_load_missing_room_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsRoomStore::new(dir.path());
        assert!(store.load(RoomId::new()).await.expect("load").is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsRoomStore::new(dir.path());
        let room_id = RoomId::new();
        let mut saved = saved_room();

        store.save(room_id, &saved).await.expect("save");
        saved.game_state.party.clear();
        store.save(room_id, &saved).await.expect("save again");

        let loaded = store.load(room_id).await.expect("load").expect("present");
        assert!(loaded.game_state.party.is_empty());
    }
}
