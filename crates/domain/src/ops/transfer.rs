//! Item transfer transforms
//!
//! Offer-time validation and the atomic slot move. Pending-intent
//! bookkeeping lives in `TransferBook`; the authoritative session decides
//! when to execute based on `requires_confirmation`.

use chrono::{DateTime, Utc};

use crate::actors::ActorKey;
use crate::error::DomainError;
use crate::ids::ItemId;
use crate::inventory::{push_unmerged, take_slot};
use crate::state::GameState;

use super::transformed;

/// Validate an offer and compute whether it needs recipient confirmation.
///
/// Confirmation is required exactly when the recipient is a player-owned
/// character; NPC recipients and unowned characters receive immediately.
pub fn validate_offer(
    state: &GameState,
    from: ActorKey,
    to: ActorKey,
    slot_index: usize,
) -> Result<(ItemId, bool), DomainError> {
    if from == to {
        return Err(DomainError::constraint(
            "sender and recipient are the same actor",
        ));
    }
    let inventory = state.actor(from)?.inventory();
    let item_id = inventory
        .get(slot_index)
        .ok_or(DomainError::InvalidSlot {
            index: slot_index,
            len: inventory.len(),
        })?
        .item
        .item_id;
    let requires_confirmation = state.actor_owner(to)?.is_some();
    Ok((item_id, requires_confirmation))
}

/// Move the whole inventory slot from sender to recipient in one transition.
///
/// The slot is re-validated against the offered item id: the sender's
/// inventory may have shifted while the offer was pending.
pub fn execute(
    state: &GameState,
    from: ActorKey,
    to: ActorKey,
    slot_index: usize,
    item_id: ItemId,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let slot = {
            let mut sender = next.actor_mut(from)?;
            let inventory = sender.inventory_mut();
            let len = inventory.len();
            let slot = inventory.get(slot_index).ok_or(DomainError::InvalidSlot {
                index: slot_index,
                len,
            })?;
            if slot.item.item_id != item_id {
                return Err(DomainError::constraint(
                    "inventory slot changed since the transfer was offered",
                ));
            }
            take_slot(inventory, slot_index)?
        };
        let mut recipient = next.actor_mut(to)?;
        push_unmerged(recipient.inventory_mut(), slot);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{Character, EntityInstance};
    use crate::catalog::{EntityTemplate, Item};
    use crate::ids::PlayerId;
    use crate::inventory::add_to_inventory;

    struct Fixture {
        state: GameState,
        sender: ActorKey,
        owned_recipient: ActorKey,
        field_recipient: ActorKey,
        item: Item,
    }

    fn fixture() -> Fixture {
        let item = Item::new("Healing Potion").with_uses(2);
        let mut state = GameState::new(Utc::now());

        let mut sender = Character::new("Ash", 10, 5, 5);
        add_to_inventory(&mut sender.inventory, &item, 1);
        let sender_key = ActorKey::Character(sender.id);

        let recipient = Character::new("Brin", 10, 5, 5).owned_by(PlayerId::new());
        let recipient_key = ActorKey::Character(recipient.id);

        let template = EntityTemplate::new("Goblin", 8, 3);
        let instance = EntityInstance::spawn(&template);
        let field_key = ActorKey::FieldEntity(instance.instance_id);

        state.catalog.items.insert(item.id, item.clone());
        state.catalog.entities.insert(template.id, template);
        state.party.push(sender);
        state.party.push(recipient);
        state.field.push(instance);

        Fixture {
            state,
            sender: sender_key,
            owned_recipient: recipient_key,
            field_recipient: field_key,
            item,
        }
    }

    #[test]
    fn test_offer_to_owned_character_requires_confirmation() {
        let f = fixture();
        let (item_id, requires) =
            validate_offer(&f.state, f.sender, f.owned_recipient, 0).expect("valid offer");
        assert_eq!(item_id, f.item.id);
        assert!(requires);
    }

    #[test]
    fn test_offer_to_field_entity_is_immediate() {
        let f = fixture();
        let (_, requires) =
            validate_offer(&f.state, f.sender, f.field_recipient, 0).expect("valid offer");
        assert!(!requires);
    }

    #[test]
    fn test_execute_moves_slot_atomically() {
        let f = fixture();
        let state = execute(
            &f.state,
            f.sender,
            f.field_recipient,
            0,
            f.item.id,
            Utc::now(),
        )
        .expect("execute");

        assert!(state.party[0].inventory.is_empty());
        assert_eq!(state.field[0].inventory.len(), 1);
        assert_eq!(state.field[0].inventory[0].item.item_id, f.item.id);
        // Exactly one seq bump: no intermediate state was observable.
        assert_eq!(state.seq, f.state.seq + 1);
    }

    #[test]
    fn test_execute_rejects_stale_slot() {
        let f = fixture();
        let other = Item::new("Torch");
        let mut state = f.state.clone();
        state.catalog.items.insert(other.id, other.clone());
        state.party[0].inventory.clear();
        add_to_inventory(&mut state.party[0].inventory, &other, 1);

        let err = execute(&state, f.sender, f.field_recipient, 0, f.item.id, Utc::now())
            .expect_err("slot changed");
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn test_self_transfer_rejected() {
        let f = fixture();
        let err = validate_offer(&f.state, f.sender, f.sender, 0).expect_err("self transfer");
        assert!(matches!(err, DomainError::Constraint(_)));
    }
}
