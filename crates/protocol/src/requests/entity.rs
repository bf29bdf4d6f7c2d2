//! Entity template and field-instance request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{EntityId, InstanceId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityRequest {
    /// DM-only catalog maintenance
    Create {
        data: EntityData,
    },
    Update {
        entity_id: EntityId,
        data: EntityData,
    },
    Delete {
        entity_id: EntityId,
    },
    /// DM-only: place an instance of a template on the field
    Spawn {
        entity_id: EntityId,
    },
    /// DM-only: remove a field instance
    Despawn {
        instance_id: InstanceId,
    },
}

/// Complete entity template definition, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub max_hp: u32,
    pub max_sp: u32,
    #[serde(default)]
    pub sp_regen_rate: u32,
}
