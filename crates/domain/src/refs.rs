//! Reference records held by actors
//!
//! A reference points at a catalog entry by id and carries only per-instance
//! mutable state. It never duplicates catalog display data: every display or
//! rule check resolves the reference against the current catalog, and a miss
//! means "skip this reference", not "crash".

use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, SkillId, StatusEffectId};

/// Per-instance pointer to a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_id: ItemId,
    /// Remaining uses. `None` means the item has never been used and the
    /// catalog `uses` value still applies in full.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_left: Option<u32>,
}

impl ItemRef {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            uses_left: None,
        }
    }

    /// Effective remaining uses given the catalog definition.
    pub fn remaining_uses(&self, catalog_uses: Option<u32>) -> Option<u32> {
        self.uses_left.or(catalog_uses)
    }
}

/// Per-instance pointer to a catalog skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRef {
    pub skill_id: SkillId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_left: Option<u32>,
}

impl SkillRef {
    pub fn new(skill_id: SkillId) -> Self {
        Self {
            skill_id,
            uses_left: None,
        }
    }

    pub fn remaining_uses(&self, catalog_uses: Option<u32>) -> Option<u32> {
        self.uses_left.or(catalog_uses)
    }
}

/// Per-instance pointer to a catalog status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffectRef {
    pub effect_id: StatusEffectId,
}

impl StatusEffectRef {
    pub fn new(effect_id: StatusEffectId) -> Self {
        Self { effect_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_uses_defaults_to_catalog() {
        let item_ref = ItemRef::new(ItemId::new());
        assert_eq!(item_ref.remaining_uses(Some(3)), Some(3));
        assert_eq!(item_ref.remaining_uses(None), None);
    }

    #[test]
    fn test_remaining_uses_prefers_instance_state() {
        let mut item_ref = ItemRef::new(ItemId::new());
        item_ref.uses_left = Some(1);
        assert_eq!(item_ref.remaining_uses(Some(3)), Some(1));
    }
}
