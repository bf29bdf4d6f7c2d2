//! Field-placed entity instances

use serde::{Deserialize, Serialize};

use crate::catalog::EntityTemplate;
use crate::ids::{EntityId, InstanceId};
use crate::inventory::InventorySlot;
use crate::refs::{SkillRef, StatusEffectRef};

/// A live instance of a catalog entity template placed on the field
///
/// Instances are distinct from their template: stats, inventory, and skills
/// are copied at spawn time and evolve independently. The `instance_id` is
/// the only valid lookup key for a field entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInstance {
    pub instance_id: InstanceId,
    /// The catalog template this instance was spawned from
    pub entity_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_override: Option<String>,
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

impl EntityInstance {
    /// Spawn a new instance from a catalog template.
    pub fn spawn(template: &EntityTemplate) -> Self {
        Self {
            instance_id: InstanceId::new(),
            entity_id: template.id,
            name_override: None,
            hp: template.max_hp,
            max_hp: template.max_hp,
            sp: template.max_sp,
            max_sp: template.max_sp,
            sp_regen_rate: template.sp_regen_rate,
            inventory: template.inventory.clone(),
            skills: template.skills.clone(),
            status_effects: template.status_effects.clone(),
        }
    }
}
