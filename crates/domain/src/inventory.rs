//! Inventory slots and stacking rules

use serde::{Deserialize, Serialize};

use crate::catalog::Item;
use crate::error::DomainError;
use crate::refs::ItemRef;

/// One inventory slot: a reference plus a stack count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySlot {
    pub item: ItemRef,
    pub count: u32,
}

impl InventorySlot {
    pub fn new(item: ItemRef, count: u32) -> Self {
        Self { item, count }
    }

    pub fn single(item: ItemRef) -> Self {
        Self { item, count: 1 }
    }
}

/// Add `count` units of a catalog item to an inventory.
///
/// Stackable items merge into an existing slot with the same `item_id`;
/// non-stackable items always occupy their own slot, even when several slots
/// share a `catalog_id`.
pub fn add_to_inventory(inventory: &mut Vec<InventorySlot>, item: &Item, count: u32) {
    if item.is_stackable() {
        if let Some(slot) = inventory
            .iter_mut()
            .find(|slot| slot.item.item_id == item.id && slot.item.uses_left.is_none())
        {
            slot.count += count;
            return;
        }
    }
    inventory.push(InventorySlot::new(ItemRef::new(item.id), count));
}

/// Insert an already-populated slot without merging.
///
/// Used by unequip and transfers, where the reference may carry `uses_left`
/// that must not be folded into an existing stack.
pub fn push_unmerged(inventory: &mut Vec<InventorySlot>, slot: InventorySlot) {
    inventory.push(slot);
}

/// Remove one unit from the slot at `index`, dropping the slot when empty.
///
/// Returns the reference that was removed.
pub fn take_one(
    inventory: &mut Vec<InventorySlot>,
    index: usize,
) -> Result<ItemRef, DomainError> {
    let len = inventory.len();
    let slot = inventory
        .get_mut(index)
        .ok_or(DomainError::InvalidSlot { index, len })?;
    let item = slot.item.clone();
    if slot.count > 1 {
        slot.count -= 1;
    } else {
        inventory.remove(index);
    }
    Ok(item)
}

/// Remove the whole slot at `index`.
pub fn take_slot(
    inventory: &mut Vec<InventorySlot>,
    index: usize,
) -> Result<InventorySlot, DomainError> {
    let len = inventory.len();
    if index >= len {
        return Err(DomainError::InvalidSlot { index, len });
    }
    Ok(inventory.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    #[test]
    fn test_stackable_items_merge() {
        let torch = Item::new("Torch");
        let mut inventory = Vec::new();
        add_to_inventory(&mut inventory, &torch, 2);
        add_to_inventory(&mut inventory, &torch, 3);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].count, 5);
    }

    #[test]
    fn test_non_stackable_items_get_own_slots() {
        let potion = Item::new("Healing Potion").with_uses(2);
        let mut inventory = Vec::new();
        add_to_inventory(&mut inventory, &potion, 1);
        add_to_inventory(&mut inventory, &potion, 1);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_take_one_decrements_then_removes() {
        let torch = Item::new("Torch");
        let mut inventory = Vec::new();
        add_to_inventory(&mut inventory, &torch, 2);

        take_one(&mut inventory, 0).expect("slot exists");
        assert_eq!(inventory[0].count, 1);

        take_one(&mut inventory, 0).expect("slot exists");
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_take_one_rejects_bad_index() {
        let mut inventory = Vec::new();
        let err = take_one(&mut inventory, 0).expect_err("empty inventory");
        assert!(matches!(err, DomainError::InvalidSlot { .. }));
    }

    #[test]
    fn test_push_unmerged_keeps_separate_slot() {
        let torch = Item::new("Torch");
        let mut inventory = Vec::new();
        add_to_inventory(&mut inventory, &torch, 3);

        push_unmerged(&mut inventory, InventorySlot::single(ItemRef::new(torch.id)));
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].count, 3);
        assert_eq!(inventory[1].count, 1);
    }
}
