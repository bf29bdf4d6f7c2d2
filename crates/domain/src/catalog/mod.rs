//! Catalog entities and the global collections that own them
//!
//! Catalog objects are the single source of truth for shared attributes and
//! are created, updated, and deleted only through DM-authoritative operations.

mod entity_template;
mod image;
mod item;
mod skill;
mod status_effect;

pub use entity_template::EntityTemplate;
pub use image::ImageMeta;
pub use item::Item;
pub use skill::Skill;
pub use status_effect::StatusEffect;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, ImageId, ItemId, SkillId, StatusEffectId};

/// The DM-owned global collections of a room
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub items: BTreeMap<ItemId, Item>,
    #[serde(default)]
    pub skills: BTreeMap<SkillId, Skill>,
    #[serde(default)]
    pub status_effects: BTreeMap<StatusEffectId, StatusEffect>,
    #[serde(default)]
    pub entities: BTreeMap<EntityId, EntityTemplate>,
    #[serde(default)]
    pub images: BTreeMap<ImageId, ImageMeta>,
}

impl Catalog {
    /// Resolve an item reference. A miss is non-fatal; callers skip the
    /// reference.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(&id)
    }

    pub fn status_effect(&self, id: StatusEffectId) -> Option<&StatusEffect> {
        self.status_effects.get(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityTemplate> {
        self.entities.get(&id)
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageMeta> {
        self.images.get(&id)
    }
}
