//! Player-facing character actor

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, ImageId, PlayerId};
use crate::inventory::InventorySlot;
use crate::refs::{ItemRef, SkillRef, StatusEffectRef};

/// A party character
///
/// The only actor kind with MP, an equipment list, and a player ownership
/// binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
    /// Owning peer; None means the character is DM-run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub sp: u32,
    pub max_sp: u32,
    pub sp_regen_rate: u32,
    #[serde(default)]
    pub inventory: Vec<InventorySlot>,
    #[serde(default)]
    pub equipment: Vec<ItemRef>,
    #[serde(default)]
    pub skills: Vec<SkillRef>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffectRef>,
}

impl Character {
    pub fn new(name: impl Into<String>, max_hp: u32, max_mp: u32, max_sp: u32) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            description: None,
            image: None,
            player_id: None,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            sp: max_sp,
            max_sp,
            sp_regen_rate: 0,
            inventory: Vec::new(),
            equipment: Vec::new(),
            skills: Vec::new(),
            status_effects: Vec::new(),
        }
    }

    pub fn with_sp_regen(mut self, rate: u32) -> Self {
        self.sp_regen_rate = rate;
        self
    }

    pub fn owned_by(mut self, player_id: PlayerId) -> Self {
        self.player_id = Some(player_id);
        self
    }

    pub fn is_owned_by(&self, player_id: PlayerId) -> bool {
        self.player_id == Some(player_id)
    }
}
