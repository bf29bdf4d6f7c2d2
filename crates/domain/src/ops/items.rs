//! Item use and catalog maintenance transforms

use chrono::{DateTime, Utc};

use crate::actors::ActorKey;
use crate::catalog::Item;
use crate::error::DomainError;
use crate::ids::ItemId;
use crate::inventory::{add_to_inventory, take_slot};
use crate::state::GameState;

use super::transformed;

/// Use one charge of the item in the given inventory slot.
///
/// Only items with a finite catalog `uses` can be used mechanically;
/// unlimited items are equipped or discarded instead. `uses_left` defaults
/// to the catalog value the first time a reference is used.
pub fn use_item(
    state: &GameState,
    actor: ActorKey,
    slot_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let item_id = {
            let mut handle = next.actor_mut(actor)?;
            let inventory = handle.inventory_mut();
            let len = inventory.len();
            inventory
                .get(slot_index)
                .ok_or(DomainError::InvalidSlot {
                    index: slot_index,
                    len,
                })?
                .item
                .item_id
        };

        let catalog_uses = next
            .catalog
            .item(item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id))?
            .uses;
        let Some(catalog_uses) = catalog_uses else {
            return Err(DomainError::constraint(
                "item has unlimited uses and cannot be consumed",
            ));
        };

        let mut handle = next.actor_mut(actor)?;
        let inventory = handle.inventory_mut();
        let len = inventory.len();
        let slot = inventory.get_mut(slot_index).ok_or(DomainError::InvalidSlot {
            index: slot_index,
            len,
        })?;
        let remaining = slot.item.uses_left.unwrap_or(catalog_uses);
        if remaining == 0 {
            return Err(DomainError::UsesExhausted(item_id.to_string()));
        }
        slot.item.uses_left = Some(remaining - 1);
        Ok(())
    })
}

/// Remove an inventory slot outright. No confirmation happens here; that is
/// a UI concern on the calling side.
pub fn discard_item(
    state: &GameState,
    actor: ActorKey,
    slot_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let mut handle = next.actor_mut(actor)?;
        take_slot(handle.inventory_mut(), slot_index)?;
        Ok(())
    })
}

/// Hand an actor `count` units of a catalog item, applying stacking rules.
pub fn give_item(
    state: &GameState,
    actor: ActorKey,
    item_id: ItemId,
    count: u32,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if count == 0 {
            return Err(DomainError::constraint("count must be at least 1"));
        }
        let item = next
            .catalog
            .item(item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id))?
            .clone();
        let mut handle = next.actor_mut(actor)?;
        add_to_inventory(handle.inventory_mut(), &item, count);
        Ok(())
    })
}

/// Reset a reference's remaining uses back to the catalog default.
pub fn restore_uses(
    state: &GameState,
    actor: ActorKey,
    slot_index: usize,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let mut handle = next.actor_mut(actor)?;
        let inventory = handle.inventory_mut();
        let len = inventory.len();
        let slot = inventory.get_mut(slot_index).ok_or(DomainError::InvalidSlot {
            index: slot_index,
            len,
        })?;
        slot.item.uses_left = None;
        Ok(())
    })
}

pub fn create_item(
    state: &GameState,
    item: Item,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog.items.insert(item.id, item);
        Ok(())
    })
}

/// Replace a catalog item's definition, keeping its id.
pub fn update_item(
    state: &GameState,
    id: ItemId,
    mut item: Item,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if !next.catalog.items.contains_key(&id) {
            return Err(DomainError::not_found("Item", id));
        }
        item.id = id;
        next.catalog.items.insert(id, item);
        Ok(())
    })
}

/// Delete a catalog item and purge every reference to it in the same
/// transition.
pub fn delete_item(
    state: &GameState,
    id: ItemId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.catalog
            .items
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Item", id))?;
        next.purge_item_refs(id);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Character;

    fn state_with_item(item: Item, count: u32) -> (GameState, ActorKey) {
        let mut state = GameState::new(Utc::now());
        let mut character = Character::new("Ash", 10, 5, 5);
        add_to_inventory(&mut character.inventory, &item, count);
        let key = ActorKey::Character(character.id);
        state.catalog.items.insert(item.id, item);
        state.party.push(character);
        (state, key)
    }

    #[test]
    fn test_uses_decrease_until_rejected() {
        let item = Item::new("Healing Potion").with_uses(2);
        let (state, key) = state_with_item(item, 1);
        let now = Utc::now();

        let state = use_item(&state, key, 0, now).expect("first use");
        assert_eq!(state.party[0].inventory[0].item.uses_left, Some(1));

        let state = use_item(&state, key, 0, now).expect("second use");
        assert_eq!(state.party[0].inventory[0].item.uses_left, Some(0));

        let err = use_item(&state, key, 0, now).expect_err("exhausted");
        assert!(matches!(err, DomainError::UsesExhausted(_)));
        // Rejection left the snapshot untouched.
        assert_eq!(state.party[0].inventory[0].item.uses_left, Some(0));
    }

    #[test]
    fn test_unlimited_items_cannot_be_used() {
        let item = Item::new("Torch");
        let (state, key) = state_with_item(item, 1);
        let err = use_item(&state, key, 0, Utc::now()).expect_err("unlimited");
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn test_use_skips_dangling_reference() {
        let item = Item::new("Healing Potion").with_uses(2);
        let (mut state, key) = state_with_item(item.clone(), 1);
        state.catalog.items.remove(&item.id);

        let err = use_item(&state, key, 0, Utc::now()).expect_err("dangling ref");
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn test_discard_removes_whole_slot() {
        let item = Item::new("Torch");
        let (state, key) = state_with_item(item, 3);
        let state = discard_item(&state, key, 0, Utc::now()).expect("discard");
        assert!(state.party[0].inventory.is_empty());
    }

    #[test]
    fn test_restore_uses_resets_to_catalog_default() {
        let item = Item::new("Healing Potion").with_uses(2);
        let (state, key) = state_with_item(item, 1);
        let now = Utc::now();
        let state = use_item(&state, key, 0, now).expect("use");
        let state = restore_uses(&state, key, 0, now).expect("restore");
        assert_eq!(state.party[0].inventory[0].item.uses_left, None);
    }

    #[test]
    fn test_delete_item_purges_references() {
        let item = Item::new("Cursed Idol");
        let (state, _key) = state_with_item(item.clone(), 2);
        let state = delete_item(&state, item.id, Utc::now()).expect("delete");
        assert!(state.catalog.items.is_empty());
        assert!(state.party[0].inventory.is_empty());
    }

    #[test]
    fn test_give_item_stacks() {
        let item = Item::new("Torch");
        let (state, key) = state_with_item(item.clone(), 1);
        let state = give_item(&state, key, item.id, 2, Utc::now()).expect("give");
        assert_eq!(state.party[0].inventory.len(), 1);
        assert_eq!(state.party[0].inventory[0].count, 3);
    }
}
