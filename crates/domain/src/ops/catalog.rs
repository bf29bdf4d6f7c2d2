//! Catalog maintenance transforms for entity templates, status effects, and
//! image metadata

use chrono::{DateTime, Utc};

use crate::catalog::{EntityTemplate, ImageMeta, StatusEffect};
use crate::error::DomainError;
use crate::ids::{EntityId, StatusEffectId};
use crate::state::GameState;

use super::transformed;

pub fn create_entity(
    state: &GameState,
    template: EntityTemplate,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog.entities.insert(template.id, template);
        Ok(())
    })
}

/// Replace a template's definition, keeping its id. Live field instances are
/// untouched; they copied their stats at spawn time.
pub fn update_entity(
    state: &GameState,
    id: EntityId,
    mut template: EntityTemplate,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if !next.catalog.entities.contains_key(&id) {
            return Err(DomainError::not_found("EntityTemplate", id));
        }
        template.id = id;
        next.catalog.entities.insert(id, template);
        Ok(())
    })
}

/// Delete a template and despawn every field instance spawned from it, so no
/// instance is left pointing at a missing catalog entry.
pub fn delete_entity(
    state: &GameState,
    id: EntityId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .entities
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("EntityTemplate", id))?;
        let orphaned: Vec<_> = next
            .field
            .iter()
            .filter(|e| e.entity_id == id)
            .map(|e| e.instance_id)
            .collect();
        next.field.retain(|e| e.entity_id != id);
        if let Some(combat) = next.combat.as_mut() {
            for instance_id in orphaned {
                combat.remove_piece(crate::actors::ActorKey::FieldEntity(instance_id));
            }
        }
        Ok(())
    })
}

pub fn create_status_effect(
    state: &GameState,
    effect: StatusEffect,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog.status_effects.insert(effect.id, effect);
        Ok(())
    })
}

pub fn update_status_effect(
    state: &GameState,
    id: StatusEffectId,
    mut effect: StatusEffect,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if !next.catalog.status_effects.contains_key(&id) {
            return Err(DomainError::not_found("StatusEffect", id));
        }
        effect.id = id;
        next.catalog.status_effects.insert(id, effect);
        Ok(())
    })
}

pub fn delete_status_effect(
    state: &GameState,
    id: StatusEffectId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .status_effects
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("StatusEffect", id))?;
        next.purge_status_effect_refs(id);
        Ok(())
    })
}

/// Publish an image's metadata after its bytes finished uploading.
pub fn register_image(
    state: &GameState,
    meta: ImageMeta,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog.images.insert(meta.id, meta);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::EntityInstance;

    #[test]
    fn test_delete_entity_despawns_instances() {
        let mut state = GameState::new(Utc::now());
        let template = EntityTemplate::new("Goblin", 10, 5);
        let id = template.id;
        state.field.push(EntityInstance::spawn(&template));
        state.field.push(EntityInstance::spawn(&template));
        state.catalog.entities.insert(id, template);

        let state = delete_entity(&state, id, Utc::now()).expect("delete");
        assert!(state.catalog.entities.is_empty());
        assert!(state.field.is_empty());
    }

    #[test]
    fn test_delete_status_effect_purges_refs() {
        let mut state = GameState::new(Utc::now());
        let effect = StatusEffect::new("Poisoned");
        let id = effect.id;
        state.catalog.status_effects.insert(id, effect);
        let mut character = crate::actors::Character::new("Ash", 10, 5, 5);
        character
            .status_effects
            .push(crate::refs::StatusEffectRef::new(id));
        state.party.push(character);

        let state = delete_status_effect(&state, id, Utc::now()).expect("delete");
        assert!(state.party[0].status_effects.is_empty());
    }
}
