//! The shared game-state snapshot
//!
//! One immutable-by-convention value per room. Every mutation computes a new
//! snapshot (clone, transform, bump) and replaces the old one wholesale; the
//! authoritative side is the only writer, replicas mirror the last broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actors::{ActorKey, ActorMut, ActorRef, Character, EntityInstance};
use crate::catalog::Catalog;
use crate::combat::CombatState;
use crate::error::DomainError;
use crate::ids::{CharacterId, ImageId, InstanceId, ItemId, PlayerId, SkillId, StatusEffectId};

/// What the table screen is currently showing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    /// Actor highlighted on the shared display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_actor: Option<ActorKey>,
    /// Backdrop image shown to all peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_image: Option<ImageId>,
}

/// Shared audio playback state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioState {
    #[serde(default)]
    pub playlist: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track: Option<usize>,
    #[serde(default)]
    pub playing: bool,
}

/// One room's complete shared state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub party: Vec<Character>,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub field: Vec<EntityInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatState>,
    #[serde(default)]
    pub display: DisplayState,
    #[serde(default)]
    pub audio: AudioState,
    /// Monotonic per-mutation counter; replicas discard broadcasts whose
    /// seq is not newer than what they already hold.
    #[serde(default)]
    pub seq: u64,
    pub last_modified: DateTime<Utc>,
}

impl GameState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            party: Vec::new(),
            catalog: Catalog::default(),
            field: Vec::new(),
            combat: None,
            display: DisplayState::default(),
            audio: AudioState::default(),
            seq: 0,
            last_modified: now,
        }
    }

    /// Advance seq and stamp the modification time. Called once per applied
    /// mutation, after the transform succeeded.
    pub fn bump(&mut self, now: DateTime<Utc>) {
        self.seq += 1;
        self.last_modified = now;
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.party.iter().find(|c| c.id == id)
    }

    pub fn field_entity(&self, id: InstanceId) -> Option<&EntityInstance> {
        self.field.iter().find(|e| e.instance_id == id)
    }

    /// Resolve an actor key to a read-only handle.
    pub fn actor(&self, key: ActorKey) -> Result<ActorRef<'_>, DomainError> {
        match key {
            ActorKey::Character(id) => self
                .character(id)
                .map(ActorRef::Character)
                .ok_or_else(|| DomainError::not_found("Character", id)),
            ActorKey::GlobalEntity(id) => self
                .catalog
                .entity(id)
                .map(ActorRef::GlobalEntity)
                .ok_or_else(|| DomainError::not_found("EntityTemplate", id)),
            ActorKey::FieldEntity(id) => self
                .field_entity(id)
                .map(ActorRef::FieldEntity)
                .ok_or_else(|| DomainError::not_found("EntityInstance", id)),
        }
    }

    /// Resolve an actor key to a mutable handle.
    ///
    /// The single lookup path for all three actor kinds; field entities are
    /// found by `instance_id` only.
    pub fn actor_mut(&mut self, key: ActorKey) -> Result<ActorMut<'_>, DomainError> {
        match key {
            ActorKey::Character(id) => self
                .party
                .iter_mut()
                .find(|c| c.id == id)
                .map(ActorMut::Character)
                .ok_or_else(|| DomainError::not_found("Character", id)),
            ActorKey::GlobalEntity(id) => self
                .catalog
                .entities
                .get_mut(&id)
                .map(ActorMut::GlobalEntity)
                .ok_or_else(|| DomainError::not_found("EntityTemplate", id)),
            ActorKey::FieldEntity(id) => self
                .field
                .iter_mut()
                .find(|e| e.instance_id == id)
                .map(ActorMut::FieldEntity)
                .ok_or_else(|| DomainError::not_found("EntityInstance", id)),
        }
    }

    /// Owning peer of an actor, or None when unowned / not a character.
    /// Errors when the actor does not exist at all.
    pub fn actor_owner(&self, key: ActorKey) -> Result<Option<PlayerId>, DomainError> {
        Ok(self.actor(key)?.player_id())
    }

    /// Active combat state, or a constraint error when combat is inactive.
    pub fn combat_mut(&mut self) -> Result<&mut CombatState, DomainError> {
        self.combat
            .as_mut()
            .ok_or_else(|| DomainError::constraint("combat is not active"))
    }

    /// All actors that take part in combat placement: party members and
    /// field instances. Global entities stay in the catalog.
    pub fn combatant_keys(&self) -> Vec<(ActorKey, crate::combat::Side)> {
        let party = self
            .party
            .iter()
            .map(|c| (ActorKey::Character(c.id), crate::combat::Side::Party));
        let field = self.field.iter().map(|e| {
            (
                ActorKey::FieldEntity(e.instance_id),
                crate::combat::Side::Enemies,
            )
        });
        party.chain(field).collect()
    }

    /// Purge every reference to a deleted catalog item from every actor.
    ///
    /// Runs in the same snapshot transition as the catalog removal so no
    /// dangling reference survives the broadcast.
    pub fn purge_item_refs(&mut self, id: ItemId) {
        for character in &mut self.party {
            character.inventory.retain(|slot| slot.item.item_id != id);
            character.equipment.retain(|item| item.item_id != id);
        }
        for instance in &mut self.field {
            instance.inventory.retain(|slot| slot.item.item_id != id);
        }
        for template in self.catalog.entities.values_mut() {
            template.inventory.retain(|slot| slot.item.item_id != id);
        }
    }

    pub fn purge_skill_refs(&mut self, id: SkillId) {
        for character in &mut self.party {
            character.skills.retain(|skill| skill.skill_id != id);
        }
        for instance in &mut self.field {
            instance.skills.retain(|skill| skill.skill_id != id);
        }
        for template in self.catalog.entities.values_mut() {
            template.skills.retain(|skill| skill.skill_id != id);
        }
    }

    pub fn purge_status_effect_refs(&mut self, id: StatusEffectId) {
        for character in &mut self.party {
            character.status_effects.retain(|e| e.effect_id != id);
        }
        for instance in &mut self.field {
            instance.status_effects.retain(|e| e.effect_id != id);
        }
        for template in self.catalog.entities.values_mut() {
            template.status_effects.retain(|e| e.effect_id != id);
        }
    }

    /// Strip player ownership bindings, applied before export so imported
    /// saves carry no stale peer ids.
    pub fn strip_player_ownership(&mut self) {
        for character in &mut self.party {
            character.player_id = None;
        }
    }
}
