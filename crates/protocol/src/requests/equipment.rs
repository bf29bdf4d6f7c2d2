//! Equipment request types

use serde::{Deserialize, Serialize};

use tableforge_domain::CharacterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquipmentRequest {
    Equip {
        character_id: CharacterId,
        slot_index: usize,
    },
    Unequip {
        character_id: CharacterId,
        equipment_index: usize,
    },
    Discard {
        character_id: CharacterId,
        equipment_index: usize,
    },
}
