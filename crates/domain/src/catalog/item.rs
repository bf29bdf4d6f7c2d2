//! Item catalog entity - the canonical definition an `ItemRef` points at

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{ImageId, ItemId};

/// Canonical, DM-owned definition of an item
///
/// Shared display data (name, description, image) lives only here; per-instance
/// state (`uses_left`) lives on the `ItemRef` held by an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
    /// Search/classification tags
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Number of times the item can be used (None = unlimited, not "usable")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<u32>,
    /// Whether a character can move this item into their equipment
    #[serde(default)]
    pub is_equippable: bool,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            description: None,
            image: None,
            tags: BTreeSet::new(),
            uses: None,
            is_equippable: false,
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

    pub fn equippable(mut self) -> Self {
        self.is_equippable = true;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// An item stacks when it carries no per-instance state: unlimited uses
    /// and not equippable. Everything else occupies its own inventory slot.
    pub fn is_stackable(&self) -> bool {
        self.uses.is_none() && !self.is_equippable
    }
}
