//! Skill request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, SkillId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillRequest {
    Use {
        actor: ActorKey,
        skill_index: usize,
    },
    /// DM-only: add a catalog skill to an actor's list
    Learn {
        actor: ActorKey,
        skill_id: SkillId,
    },
    Remove {
        actor: ActorKey,
        skill_index: usize,
    },
    /// DM-only catalog maintenance
    Create {
        data: SkillData,
    },
    Update {
        skill_id: SkillId,
        data: SkillData,
    },
    Delete {
        skill_id: SkillId,
    },
}

/// Complete skill definition, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub damage: i32,
    pub sp_cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<u32>,
}
