//! Room-level request types: snapshot fetch, display/audio, save and load

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tableforge_domain::{AudioState, DisplayState, GameState, ImageId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomRequest {
    /// Fetch the current snapshot (used on reconnect)
    GetState,
    /// DM-only: replace the shared display state
    SetDisplay { display: DisplayState },
    /// DM-only: replace the shared audio state
    SetAudio { audio: AudioState },
    /// DM-only: export the room as a save file
    Export,
    /// DM-only: replace the room state from a save file
    Import { data: SaveData },
}

/// An exported room
///
/// Player ownership bindings are stripped before export so imported saves
/// carry no stale peer ids. Images referenced by the catalog may be bundled
/// as base64 payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub state: GameState,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<ImageId, BundledImage>,
}

/// A catalog image bundled into a save file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledImage {
    pub name: String,
    pub mime_type: String,
    /// Raw bytes, base64-encoded
    pub data: String,
}
