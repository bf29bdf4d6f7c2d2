//! Equip / unequip transforms
//!
//! Equipment is a character-only concern. Unequip deliberately produces a
//! fresh, unmerged inventory slot so a partially-used reference keeps its own
//! `uses_left` instead of disappearing into a stack.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::inventory::{push_unmerged, take_one, InventorySlot};
use crate::state::GameState;

use super::transformed;

/// Move one unit from an inventory slot into the character's equipment.
pub fn equip(
    state: &GameState,
    character_id: CharacterId,
    slot_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let item_id = {
            let character = next
                .character(character_id)
                .ok_or_else(|| DomainError::not_found("Character", character_id))?;
            let len = character.inventory.len();
            character
                .inventory
                .get(slot_index)
                .ok_or(DomainError::InvalidSlot {
                    index: slot_index,
                    len,
                })?
                .item
                .item_id
        };

        let equippable = next
            .catalog
            .item(item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id))?
            .is_equippable;
        if !equippable {
            return Err(DomainError::NotEquippable(item_id.to_string()));
        }

        let character = next
            .party
            .iter_mut()
            .find(|c| c.id == character_id)
            .ok_or_else(|| DomainError::not_found("Character", character_id))?;
        let item_ref = take_one(&mut character.inventory, slot_index)?;
        character.equipment.push(item_ref);
        Ok(())
    })
}

/// Move an equipped reference back into the inventory as a new slot of one.
pub fn unequip(
    state: &GameState,
    character_id: CharacterId,
    equipment_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let character = next
            .party
            .iter_mut()
            .find(|c| c.id == character_id)
            .ok_or_else(|| DomainError::not_found("Character", character_id))?;
        let len = character.equipment.len();
        if equipment_index >= len {
            return Err(DomainError::InvalidSlot {
                index: equipment_index,
                len,
            });
        }
        let item_ref = character.equipment.remove(equipment_index);
        push_unmerged(&mut character.inventory, InventorySlot::single(item_ref));
        Ok(())
    })
}

/// Drop an equipped reference outright.
pub fn discard_equipment(
    state: &GameState,
    character_id: CharacterId,
    equipment_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let character = next
            .party
            .iter_mut()
            .find(|c| c.id == character_id)
            .ok_or_else(|| DomainError::not_found("Character", character_id))?;
        let len = character.equipment.len();
        if equipment_index >= len {
            return Err(DomainError::InvalidSlot {
                index: equipment_index,
                len,
            });
        }
        character.equipment.remove(equipment_index);
        Ok(())
    })
}
