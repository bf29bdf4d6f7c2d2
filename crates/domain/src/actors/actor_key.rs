//! Uniform actor addressing
//!
//! Every mutable operation addresses its target through `ActorKey`, a sum
//! type over the three actor kinds. Characters and global entities are keyed
//! by their catalog id; field entities are keyed by `InstanceId` only.

use serde::{Deserialize, Serialize};

use crate::actors::{Character, EntityInstance};
use crate::catalog::EntityTemplate;
use crate::error::DomainError;
use crate::ids::{CharacterId, EntityId, InstanceId, PlayerId};
use crate::inventory::InventorySlot;
use crate::refs::{SkillRef, StatusEffectRef};
use crate::stats::{apply_delta, StatKind};

/// Address of an actor within a snapshot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ActorKey {
    Character(CharacterId),
    GlobalEntity(EntityId),
    FieldEntity(InstanceId),
}

impl std::fmt::Display for ActorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character(id) => write!(f, "character/{id}"),
            Self::GlobalEntity(id) => write!(f, "entity/{id}"),
            Self::FieldEntity(id) => write!(f, "instance/{id}"),
        }
    }
}

/// Read-only handle over any actor kind
pub enum ActorRef<'a> {
    Character(&'a Character),
    GlobalEntity(&'a EntityTemplate),
    FieldEntity(&'a EntityInstance),
}

impl<'a> ActorRef<'a> {
    pub fn inventory(&self) -> &'a [InventorySlot] {
        match self {
            Self::Character(c) => &c.inventory,
            Self::GlobalEntity(e) => &e.inventory,
            Self::FieldEntity(i) => &i.inventory,
        }
    }

    /// Owning peer; only characters can be owned.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Self::Character(c) => c.player_id,
            _ => None,
        }
    }
}

/// Mutable handle over any actor kind
///
/// Collapses the per-kind branching into one place so handlers never repeat
/// the three-way lookup.
pub enum ActorMut<'a> {
    Character(&'a mut Character),
    GlobalEntity(&'a mut EntityTemplate),
    FieldEntity(&'a mut EntityInstance),
}

impl ActorMut<'_> {
    pub fn sp(&self) -> u32 {
        match self {
            Self::Character(c) => c.sp,
            Self::GlobalEntity(e) => e.sp,
            Self::FieldEntity(i) => i.sp,
        }
    }

    pub fn inventory_mut(&mut self) -> &mut Vec<InventorySlot> {
        match self {
            Self::Character(c) => &mut c.inventory,
            Self::GlobalEntity(e) => &mut e.inventory,
            Self::FieldEntity(i) => &mut i.inventory,
        }
    }

    pub fn skills_mut(&mut self) -> &mut Vec<SkillRef> {
        match self {
            Self::Character(c) => &mut c.skills,
            Self::GlobalEntity(e) => &mut e.skills,
            Self::FieldEntity(i) => &mut i.skills,
        }
    }

    pub fn status_effects_mut(&mut self) -> &mut Vec<StatusEffectRef> {
        match self {
            Self::Character(c) => &mut c.status_effects,
            Self::GlobalEntity(e) => &mut e.status_effects,
            Self::FieldEntity(i) => &mut i.status_effects,
        }
    }

    /// Apply a signed delta to a stat pool, clamped to `[0, max]`.
    ///
    /// MP exists only on characters; adjusting it on any other actor kind is
    /// a constraint violation.
    pub fn adjust_stat(&mut self, stat: StatKind, delta: i32) -> Result<(), DomainError> {
        match (stat, &mut *self) {
            (StatKind::Hp, Self::Character(c)) => c.hp = apply_delta(c.hp, c.max_hp, delta),
            (StatKind::Hp, Self::GlobalEntity(e)) => e.hp = apply_delta(e.hp, e.max_hp, delta),
            (StatKind::Hp, Self::FieldEntity(i)) => i.hp = apply_delta(i.hp, i.max_hp, delta),
            (StatKind::Sp, Self::Character(c)) => c.sp = apply_delta(c.sp, c.max_sp, delta),
            (StatKind::Sp, Self::GlobalEntity(e)) => e.sp = apply_delta(e.sp, e.max_sp, delta),
            (StatKind::Sp, Self::FieldEntity(i)) => i.sp = apply_delta(i.sp, i.max_sp, delta),
            (StatKind::Mp, Self::Character(c)) => c.mp = apply_delta(c.mp, c.max_mp, delta),
            (StatKind::Mp, _) => {
                return Err(DomainError::constraint("only characters have MP"));
            }
        }
        Ok(())
    }

    /// Spend SP for a skill use. Fails without mutating when SP is short.
    pub fn spend_sp(&mut self, cost: u32) -> Result<(), DomainError> {
        let have = self.sp();
        if have < cost {
            return Err(DomainError::InsufficientSp { have, need: cost });
        }
        self.adjust_stat(StatKind::Sp, -(cost as i32))
    }
}
