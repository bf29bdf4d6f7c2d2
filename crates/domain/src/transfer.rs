//! Item transfer negotiation bookkeeping
//!
//! Pending transfer intents live only in the authoritative session's memory.
//! They are never part of the snapshot and never persisted; an engine restart
//! drops them, which is safe because the offering actor still holds the item.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::actors::ActorKey;
use crate::error::DomainError;
use crate::ids::{ItemId, TransferId};

/// A pending item hand-off awaiting recipient confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub id: TransferId,
    pub item_id: ItemId,
    pub from: ActorKey,
    pub to: ActorKey,
    /// Slot locator in the sender's inventory at offer time
    pub slot_index: usize,
    pub requires_confirmation: bool,
    pub created_at: DateTime<Utc>,
}

/// Session-scoped store of pending transfer intents
///
/// Owned by the authoritative session object; created on room open, dropped
/// on room close.
#[derive(Debug, Default)]
pub struct TransferBook {
    pending: HashMap<TransferId, TransferIntent>,
}

impl TransferBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, intent: TransferIntent) {
        self.pending.insert(intent.id, intent);
    }

    pub fn get(&self, id: TransferId) -> Option<&TransferIntent> {
        self.pending.get(&id)
    }

    /// Remove a pending intent. Used on accept, reject, and cancel alike so
    /// an intent can never be discarded twice.
    pub fn take(&mut self, id: TransferId) -> Result<TransferIntent, DomainError> {
        self.pending
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("TransferIntent", id))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CharacterId;

    fn intent() -> TransferIntent {
        TransferIntent {
            id: TransferId::new(),
            item_id: ItemId::new(),
            from: ActorKey::Character(CharacterId::new()),
            to: ActorKey::Character(CharacterId::new()),
            slot_index: 0,
            requires_confirmation: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_intent_is_removed_exactly_once() {
        let mut book = TransferBook::new();
        let i = intent();
        let id = i.id;
        book.insert(i);

        assert!(book.take(id).is_ok());
        assert!(book.is_empty());
        // A second take must fail: the intent is never left dangling and
        // never discarded twice.
        assert!(matches!(
            book.take(id),
            Err(DomainError::NotFound { .. })
        ));
    }
}
