//! Skill catalog entity

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{ImageId, SkillId};

/// Canonical, DM-owned definition of a skill
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Damage dealt on use (negative values heal)
    pub damage: i32,
    /// SP cost per use
    pub sp_cost: u32,
    /// Number of times the skill can be used (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<u32>,
}

impl Skill {
    pub fn new(name: impl Into<String>, damage: i32, sp_cost: u32) -> Self {
        Self {
            id: SkillId::new(),
            name: name.into(),
            description: None,
            image: None,
            tags: BTreeSet::new(),
            damage,
            sp_cost,
            uses: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses = Some(uses);
        self
    }
}
