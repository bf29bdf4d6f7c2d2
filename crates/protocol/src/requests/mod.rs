//! Request payload types for the request/response pattern
//!
//! Each family of operations gets its own enum and a short channel tag. The
//! underlying transport limits channel names to 12 bytes, so tags are pinned
//! by a test below.

mod character;
mod combat;
mod entity;
mod equipment;
mod image;
mod items;
mod room;
mod skill;
mod status;
mod transfer;

pub use character::{CharacterRequest, CreateCharacterData, UpdateCharacterData};
pub use combat::CombatRequest;
pub use entity::{EntityData, EntityRequest};
pub use equipment::EquipmentRequest;
pub use image::{ImageChunk, ImageRequest, IMAGE_CHUNK_SIZE};
pub use items::{ItemData, ItemRequest};
pub use room::{BundledImage, RoomRequest, SaveData};
pub use skill::{SkillData, SkillRequest};
pub use status::{StatusEffectData, StatusRequest};
pub use transfer::TransferRequest;

use serde::{Deserialize, Serialize};

/// Maximum channel tag length imposed by the transport
pub const MAX_CHANNEL_LEN: usize = 12;

/// All operations that can be requested over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", content = "request", rename_all = "snake_case")]
pub enum RequestPayload {
    Character(CharacterRequest),
    Entity(EntityRequest),
    Status(StatusRequest),
    Item(ItemRequest),
    Equipment(EquipmentRequest),
    Skill(SkillRequest),
    Combat(CombatRequest),
    Transfer(TransferRequest),
    Room(RoomRequest),
    Image(ImageRequest),
}

impl RequestPayload {
    /// Channel tag the request is sent under. At most `MAX_CHANNEL_LEN`
    /// bytes.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Character(_) => "char",
            Self::Entity(_) => "entity",
            Self::Status(_) => "status",
            Self::Item(_) => "item",
            Self::Equipment(_) => "equip",
            Self::Skill(_) => "skill",
            Self::Combat(_) => "combat",
            Self::Transfer(_) => "transfer",
            Self::Room(_) => "room",
            Self::Image(_) => "image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableforge_domain::{ActorKey, CharacterId, StatKind};

    #[test]
    fn test_channel_tags_fit_transport_limit() {
        let payloads = [
            RequestPayload::Character(CharacterRequest::AdjustStat {
                actor: ActorKey::Character(CharacterId::new()),
                stat: StatKind::Hp,
                delta: -1,
            }),
            RequestPayload::Entity(EntityRequest::Delete {
                entity_id: tableforge_domain::EntityId::new(),
            }),
            RequestPayload::Status(StatusRequest::Delete {
                effect_id: tableforge_domain::StatusEffectId::new(),
            }),
            RequestPayload::Item(ItemRequest::Use {
                actor: ActorKey::Character(CharacterId::new()),
                slot_index: 0,
            }),
            RequestPayload::Equipment(EquipmentRequest::Unequip {
                character_id: CharacterId::new(),
                equipment_index: 0,
            }),
            RequestPayload::Skill(SkillRequest::Use {
                actor: ActorKey::Character(CharacterId::new()),
                skill_index: 0,
            }),
            RequestPayload::Combat(CombatRequest::Start),
            RequestPayload::Transfer(TransferRequest::Cancel {
                transfer_id: tableforge_domain::TransferId::new(),
            }),
            RequestPayload::Room(RoomRequest::GetState),
            RequestPayload::Image(ImageRequest::Fetch {
                image_id: tableforge_domain::ImageId::new(),
                index: 0,
            }),
        ];
        for payload in payloads {
            assert!(
                payload.channel().len() <= MAX_CHANNEL_LEN,
                "channel tag {} exceeds {} bytes",
                payload.channel(),
                MAX_CHANNEL_LEN
            );
        }
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = RequestPayload::Character(CharacterRequest::AdjustStat {
            actor: ActorKey::Character(CharacterId::new()),
            stat: StatKind::Sp,
            delta: 3,
        });
        let json = serde_json::to_string(&payload).expect("serialize");
        let back: RequestPayload = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(
            back,
            RequestPayload::Character(CharacterRequest::AdjustStat { delta: 3, .. })
        ));
    }
}
