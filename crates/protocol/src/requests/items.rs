//! Item request types: inventory verbs plus DM-only catalog maintenance

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, ItemId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemRequest {
    Use {
        actor: ActorKey,
        slot_index: usize,
    },
    Discard {
        actor: ActorKey,
        slot_index: usize,
    },
    /// DM-only: hand an actor `count` units of a catalog item
    Give {
        actor: ActorKey,
        item_id: ItemId,
        count: u32,
    },
    /// DM-only: reset a slot's remaining uses to the catalog default
    RestoreUses {
        actor: ActorKey,
        slot_index: usize,
    },
    /// DM-only catalog maintenance
    Create {
        data: ItemData,
    },
    Update {
        item_id: ItemId,
        data: ItemData,
    },
    Delete {
        item_id: ItemId,
    },
}

/// Complete item definition, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<u32>,
    #[serde(default)]
    pub is_equippable: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}
