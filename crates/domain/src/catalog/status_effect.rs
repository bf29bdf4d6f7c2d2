//! Status effect catalog entity

use serde::{Deserialize, Serialize};

use crate::ids::{ImageId, StatusEffectId};

/// Canonical, DM-owned definition of a status effect
///
/// Purely descriptive: mechanical consequences are adjudicated by the DM,
/// so the catalog entry carries display data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub id: StatusEffectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StatusEffectId::new(),
            name: name.into(),
            description: None,
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
