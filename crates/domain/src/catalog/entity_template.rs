//! Entity template catalog entity
//!
//! A template doubles as a "global entity" actor: the DM can run it directly
//! out of the catalog, in which case its hp/sp fields are live state. Placing
//! it on the field spawns an `EntityInstance` copy instead.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, ImageId};
use crate::inventory::InventorySlot;
use crate::refs::{SkillRef, StatusEffectRef};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTemplate {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    pub hp: u32,
    pub max_hp: u32,
    pub sp: u32,
    pub max_sp: u32,
    pub sp_regen_rate: u32,
    #[serde(default)]
    pub inventory: Vec<InventorySlot>,
    #[serde(default)]
    pub skills: Vec<SkillRef>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffectRef>,
}

impl EntityTemplate {
    pub fn new(name: impl Into<String>, max_hp: u32, max_sp: u32) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: None,
            image: None,
            tags: BTreeSet::new(),
            hp: max_hp,
            max_hp,
            sp: max_sp,
            max_sp,
            sp_regen_rate: 0,
            inventory: Vec::new(),
            skills: Vec::new(),
            status_effects: Vec::new(),
        }
    }

    pub fn with_sp_regen(mut self, rate: u32) -> Self {
        self.sp_regen_rate = rate;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
