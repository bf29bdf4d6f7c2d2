//! Tableforge Protocol - Shared types for Engine and Player communication
//!
//! This crate contains all types crossing the engine-player boundary:
//! - WebSocket message types (`ClientMessage`, `ServerMessage`)
//! - Per-family request enums and the `RequestPayload` wrapper
//! - Response and error types for the request/response pattern
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **Typed payloads** - requests carry domain ids and `ActorKey` directly;
//!    the engine re-validates everything, but nobody parses strings twice
//! 3. **Forward compatible** - unknown enum variants deserialize to `Unknown`

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{ClientMessage, ServerMessage, TransferOutcome};
pub use requests::{
    BundledImage, CharacterRequest, CombatRequest, CreateCharacterData, EntityData,
    EntityRequest, EquipmentRequest, ImageChunk, ImageRequest, ItemData, ItemRequest,
    RequestPayload, RoomRequest, SaveData, SkillData, SkillRequest, StatusEffectData,
    StatusRequest, TransferRequest, UpdateCharacterData, IMAGE_CHUNK_SIZE, MAX_CHANNEL_LEN,
};
pub use responses::{
    ConnectedUser, ErrorCode, JoinError, RequestError, ResponseResult, RoomRole,
};
