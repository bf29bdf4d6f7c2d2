//! Status effect request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, StatusEffectId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusRequest {
    /// DM-only catalog maintenance
    Create {
        data: StatusEffectData,
    },
    Update {
        effect_id: StatusEffectId,
        data: StatusEffectData,
    },
    Delete {
        effect_id: StatusEffectId,
    },
    Apply {
        actor: ActorKey,
        effect_id: StatusEffectId,
    },
    Remove {
        actor: ActorKey,
        effect_id: StatusEffectId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffectData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
