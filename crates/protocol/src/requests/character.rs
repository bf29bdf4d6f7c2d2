//! Character request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, CharacterId, StatKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharacterRequest {
    Create {
        data: CreateCharacterData,
    },
    Update {
        character_id: CharacterId,
        data: UpdateCharacterData,
    },
    Delete {
        character_id: CharacterId,
    },
    /// Bind the character to the requesting player
    Select {
        character_id: CharacterId,
    },
    AdjustStat {
        actor: ActorKey,
        stat: StatKind,
        delta: i32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub max_hp: u32,
    pub max_mp: u32,
    pub max_sp: u32,
    #[serde(default)]
    pub sp_regen_rate: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp_regen_rate: Option<u32>,
}
