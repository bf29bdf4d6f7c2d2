//! Skill use and catalog maintenance transforms

use chrono::{DateTime, Utc};

use crate::actors::ActorKey;
use crate::catalog::Skill;
use crate::error::DomainError;
use crate::ids::SkillId;
use crate::refs::SkillRef;
use crate::state::GameState;

use super::transformed;

/// Use the skill at `skill_index` on the actor's skill list.
///
/// Validates SP and remaining uses before mutating anything, then pays the
/// SP cost and decrements finite uses in one transition.
pub fn use_skill(
    state: &GameState,
    actor: ActorKey,
    skill_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let (skill_id, uses_left) = {
            let mut handle = next.actor_mut(actor)?;
            let skills = handle.skills_mut();
            let len = skills.len();
            let skill_ref = skills.get(skill_index).ok_or(DomainError::InvalidSlot {
                index: skill_index,
                len,
            })?;
            (skill_ref.skill_id, skill_ref.uses_left)
        };

        let (sp_cost, catalog_uses) = {
            let skill = next
                .catalog
                .skill(skill_id)
                .ok_or_else(|| DomainError::not_found("Skill", skill_id))?;
            (skill.sp_cost, skill.uses)
        };

        let mut handle = next.actor_mut(actor)?;
        let have = handle.sp();
        if have < sp_cost {
            return Err(DomainError::InsufficientSp {
                have,
                need: sp_cost,
            });
        }
        if let Some(catalog_uses) = catalog_uses {
            let remaining = uses_left.unwrap_or(catalog_uses);
            if remaining == 0 {
                return Err(DomainError::UsesExhausted(skill_id.to_string()));
            }
            let skills = handle.skills_mut();
            let len = skills.len();
            skills
                .get_mut(skill_index)
                .ok_or(DomainError::InvalidSlot {
                    index: skill_index,
                    len,
                })?
                .uses_left = Some(remaining - 1);
        }
        handle.spend_sp(sp_cost)
    })
}

pub fn learn_skill(
    state: &GameState,
    actor: ActorKey,
    skill_id: SkillId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .skill(skill_id)
            .ok_or_else(|| DomainError::not_found("Skill", skill_id))?;
        let mut handle = next.actor_mut(actor)?;
        let skills = handle.skills_mut();
        if skills.iter().any(|s| s.skill_id == skill_id) {
            return Err(DomainError::constraint("actor already knows this skill"));
        }
        skills.push(SkillRef::new(skill_id));
        Ok(())
    })
}

pub fn remove_skill(
    state: &GameState,
    actor: ActorKey,
    skill_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let mut handle = next.actor_mut(actor)?;
        let skills = handle.skills_mut();
        let len = skills.len();
        if skill_index >= len {
            return Err(DomainError::InvalidSlot {
                index: skill_index,
                len,
            });
        }
        skills.remove(skill_index);
        Ok(())
    })
}

pub fn create_skill(
    state: &GameState,
    skill: Skill,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog.skills.insert(skill.id, skill);
        Ok(())
    })
}

pub fn update_skill(
    state: &GameState,
    id: SkillId,
    mut skill: Skill,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if !next.catalog.skills.contains_key(&id) {
            return Err(DomainError::not_found("Skill", id));
        }
        skill.id = id;
        next.catalog.skills.insert(id, skill);
        Ok(())
    })
}

/// Delete a catalog skill and purge every reference to it.
pub fn delete_skill(
    state: &GameState,
    id: SkillId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .skills
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Skill", id))?;
        next.purge_skill_refs(id);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Character;

    fn state_with_skill(skill: Skill, sp: u32) -> (GameState, ActorKey) {
        let mut state = GameState::new(Utc::now());
        let mut character = Character::new("Ash", 10, 5, 10);
        character.sp = sp;
        character.skills.push(SkillRef::new(skill.id));
        let key = ActorKey::Character(character.id);
        state.catalog.skills.insert(skill.id, skill);
        state.party.push(character);
        (state, key)
    }

    #[test]
    fn test_use_skill_spends_sp() {
        let skill = Skill::new("Fireball", 6, 3);
        let (state, key) = state_with_skill(skill, 5);
        let state = use_skill(&state, key, 0, Utc::now()).expect("use skill");
        assert_eq!(state.party[0].sp, 2);
    }

    #[test]
    fn test_use_skill_rejects_insufficient_sp() {
        let skill = Skill::new("Fireball", 6, 3);
        let (state, key) = state_with_skill(skill, 2);
        let err = use_skill(&state, key, 0, Utc::now()).expect_err("short on SP");
        assert!(matches!(
            err,
            DomainError::InsufficientSp { have: 2, need: 3 }
        ));
    }

    #[test]
    fn test_finite_skill_uses_decrement_and_exhaust() {
        let skill = Skill::new("Smite", 10, 1).with_uses(1);
        let (state, key) = state_with_skill(skill, 10);
        let now = Utc::now();

        let state = use_skill(&state, key, 0, now).expect("first use");
        assert_eq!(state.party[0].skills[0].uses_left, Some(0));

        let err = use_skill(&state, key, 0, now).expect_err("exhausted");
        assert!(matches!(err, DomainError::UsesExhausted(_)));
    }

    #[test]
    fn test_delete_skill_purges_references() {
        let skill = Skill::new("Fireball", 6, 3);
        let id = skill.id;
        let (state, _key) = state_with_skill(skill, 5);
        let state = delete_skill(&state, id, Utc::now()).expect("delete");
        assert!(state.catalog.skills.is_empty());
        assert!(state.party[0].skills.is_empty());
    }

    #[test]
    fn test_learn_skill_rejects_duplicates() {
        let skill = Skill::new("Fireball", 6, 3);
        let id = skill.id;
        let (state, key) = state_with_skill(skill, 5);
        let err = learn_skill(&state, key, id, Utc::now()).expect_err("already known");
        assert!(matches!(err, DomainError::Constraint(_)));
    }
}
