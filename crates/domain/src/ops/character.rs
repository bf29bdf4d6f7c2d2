//! Character and field-entity lifecycle transforms

use chrono::{DateTime, Utc};

use crate::actors::{ActorKey, Character, EntityInstance};
use crate::combat::Side;
use crate::error::DomainError;
use crate::ids::{CharacterId, EntityId, InstanceId, PlayerId, StatusEffectId};
use crate::refs::StatusEffectRef;
use crate::state::GameState;
use crate::stats::StatKind;

use super::transformed;

/// Partial update for a character. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_hp: Option<u32>,
    pub max_mp: Option<u32>,
    pub max_sp: Option<u32>,
    pub sp_regen_rate: Option<u32>,
}

pub fn add_character(
    state: &GameState,
    character: Character,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if next.party.iter().any(|c| c.id == character.id) {
            return Err(DomainError::constraint("character already in party"));
        }
        next.party.push(character);
        Ok(())
    })
}

pub fn update_character(
    state: &GameState,
    id: CharacterId,
    patch: CharacterPatch,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let character = next
            .party
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("Character", id))?;
        if let Some(name) = patch.name {
            character.name = name;
        }
        if let Some(description) = patch.description {
            character.description = Some(description);
        }
        if let Some(max_hp) = patch.max_hp {
            character.max_hp = max_hp;
            character.hp = character.hp.min(max_hp);
        }
        if let Some(max_mp) = patch.max_mp {
            character.max_mp = max_mp;
            character.mp = character.mp.min(max_mp);
        }
        if let Some(max_sp) = patch.max_sp {
            character.max_sp = max_sp;
            character.sp = character.sp.min(max_sp);
        }
        if let Some(rate) = patch.sp_regen_rate {
            character.sp_regen_rate = rate;
        }
        Ok(())
    })
}

pub fn delete_character(
    state: &GameState,
    id: CharacterId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let before = next.party.len();
        next.party.retain(|c| c.id != id);
        if next.party.len() == before {
            return Err(DomainError::not_found("Character", id));
        }
        if let Some(combat) = next.combat.as_mut() {
            combat.remove_piece(ActorKey::Character(id));
        }
        Ok(())
    })
}

/// Bind a character to the requesting player.
///
/// A player holds at most one binding; selecting releases any previous one.
/// Characters already owned by another peer cannot be taken over.
pub fn select_character(
    state: &GameState,
    id: CharacterId,
    player: PlayerId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let owner = next
            .character(id)
            .ok_or_else(|| DomainError::not_found("Character", id))?
            .player_id;
        match owner {
            Some(existing) if existing != player => {
                return Err(DomainError::unauthorized(
                    "character is bound to another player",
                ));
            }
            _ => {}
        }
        for character in &mut next.party {
            if character.player_id == Some(player) {
                character.player_id = None;
            }
        }
        if let Some(character) = next.party.iter_mut().find(|c| c.id == id) {
            character.player_id = Some(player);
        }
        Ok(())
    })
}

pub fn adjust_stat(
    state: &GameState,
    actor: ActorKey,
    stat: StatKind,
    delta: i32,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.actor_mut(actor)?.adjust_stat(stat, delta)
    })
}

/// Spawn a field instance from a catalog template. While combat is active the
/// new piece is auto-placed on the enemy side.
pub fn spawn_field_entity(
    state: &GameState,
    entity_id: EntityId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let template = next
            .catalog
            .entity(entity_id)
            .ok_or_else(|| DomainError::not_found("EntityTemplate", entity_id))?;
        let instance = EntityInstance::spawn(template);
        let key = ActorKey::FieldEntity(instance.instance_id);
        next.field.push(instance);
        if let Some(combat) = next.combat.as_mut() {
            combat.place_default(key, Side::Enemies)?;
        }
        Ok(())
    })
}

pub fn remove_field_entity(
    state: &GameState,
    instance_id: InstanceId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let before = next.field.len();
        next.field.retain(|e| e.instance_id != instance_id);
        if next.field.len() == before {
            return Err(DomainError::not_found("EntityInstance", instance_id));
        }
        if let Some(combat) = next.combat.as_mut() {
            combat.remove_piece(ActorKey::FieldEntity(instance_id));
        }
        Ok(())
    })
}

pub fn apply_status_effect(
    state: &GameState,
    actor: ActorKey,
    effect_id: StatusEffectId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .status_effect(effect_id)
            .ok_or_else(|| DomainError::not_found("StatusEffect", effect_id))?;
        let mut handle = next.actor_mut(actor)?;
        let effects = handle.status_effects_mut();
        if !effects.iter().any(|e| e.effect_id == effect_id) {
            effects.push(StatusEffectRef::new(effect_id));
        }
        Ok(())
    })
}

pub fn remove_status_effect(
    state: &GameState,
    actor: ActorKey,
    effect_id: StatusEffectId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let mut handle = next.actor_mut(actor)?;
        handle.status_effects_mut().retain(|e| e.effect_id != effect_id);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityTemplate;

    fn base_state() -> GameState {
        GameState::new(Utc::now())
    }

    #[test]
    fn test_adjust_stat_clamps_both_ends() {
        let mut state = base_state();
        let character = Character::new("Ash", 10, 5, 5);
        let id = character.id;
        state.party.push(character);
        let key = ActorKey::Character(id);
        let now = Utc::now();

        let state = adjust_stat(&state, key, StatKind::Hp, 5, now).expect("adjust");
        assert_eq!(state.character(id).map(|c| c.hp), Some(10));

        let state = adjust_stat(&state, key, StatKind::Hp, -7, now).expect("adjust");
        assert_eq!(state.character(id).map(|c| c.hp), Some(3));

        let state = adjust_stat(&state, key, StatKind::Hp, -10, now).expect("adjust");
        assert_eq!(state.character(id).map(|c| c.hp), Some(0));
    }

    #[test]
    fn test_mp_rejected_on_field_entity() {
        let mut state = base_state();
        let template = EntityTemplate::new("Goblin", 10, 5);
        let instance = EntityInstance::spawn(&template);
        let key = ActorKey::FieldEntity(instance.instance_id);
        state.catalog.entities.insert(template.id, template);
        state.field.push(instance);

        let err = adjust_stat(&state, key, StatKind::Mp, 1, Utc::now()).expect_err("no MP");
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn test_each_mutation_bumps_seq() {
        let state = base_state();
        let next = add_character(&state, Character::new("Ash", 10, 5, 5), Utc::now())
            .expect("add character");
        assert_eq!(next.seq, state.seq + 1);
    }

    #[test]
    fn test_select_character_releases_previous_binding() {
        let mut state = base_state();
        let player = PlayerId::new();
        let first = Character::new("Ash", 10, 5, 5).owned_by(player);
        let second = Character::new("Brin", 10, 5, 5);
        let (first_id, second_id) = (first.id, second.id);
        state.party.push(first);
        state.party.push(second);

        let state = select_character(&state, second_id, player, Utc::now()).expect("select");
        assert_eq!(state.character(first_id).and_then(|c| c.player_id), None);
        assert_eq!(
            state.character(second_id).and_then(|c| c.player_id),
            Some(player)
        );
    }

    #[test]
    fn test_select_rejects_foreign_binding() {
        let mut state = base_state();
        let character = Character::new("Ash", 10, 5, 5).owned_by(PlayerId::new());
        let id = character.id;
        state.party.push(character);

        let err = select_character(&state, id, PlayerId::new(), Utc::now())
            .expect_err("bound to someone else");
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn test_spawn_during_combat_places_piece() {
        let mut state = base_state();
        let template = EntityTemplate::new("Goblin", 10, 5);
        let entity_id = template.id;
        state.catalog.entities.insert(entity_id, template);
        state.combat = Some(crate::combat::CombatState::new());

        let state = spawn_field_entity(&state, entity_id, Utc::now()).expect("spawn");
        assert_eq!(state.field.len(), 1);
        let combat = state.combat.as_ref().expect("combat active");
        assert_eq!(combat.positions.len(), 1);
    }
}
