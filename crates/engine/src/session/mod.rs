//! The authoritative room session
//!
//! One `GameSession` per open room: it owns the canonical snapshot, the
//! pending-transfer book, and the persist-then-broadcast step every applied
//! mutation flows through. The write lock serializes mutations, so request
//! handling is single-writer by construction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use tableforge_domain::{
    ops, ActorKey, DomainError, GameState, PlayerId, RoomId, TransferBook, TransferId,
    TransferIntent,
};
use tableforge_protocol::ServerMessage;

use crate::store::{RoomStore, SavedRoom};

/// Port for pushing messages to connected peers.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Send to every peer in the room.
    async fn broadcast(&self, room_id: RoomId, message: ServerMessage);
    /// Send to one peer only (transfer prompts and resolutions).
    async fn send_to_player(&self, room_id: RoomId, player_id: PlayerId, message: ServerMessage);
}

/// Outcome of a transfer offer
pub enum TransferFlow {
    /// No confirmation needed; the slot already moved
    Executed(GameState),
    /// Confirmation required; the intent is pending and the recipient's
    /// owning peer must be prompted
    Pending(TransferIntent),
}

/// Authoritative state of one room
pub struct GameSession {
    room_id: RoomId,
    creator: PlayerId,
    state: RwLock<GameState>,
    transfers: Mutex<TransferBook>,
    store: Arc<dyn RoomStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl GameSession {
    pub fn new(
        room_id: RoomId,
        creator: PlayerId,
        state: GameState,
        store: Arc<dyn RoomStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            room_id,
            creator,
            state: RwLock::new(state),
            transfers: Mutex::new(TransferBook::new()),
            store,
            broadcaster,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }

    /// Apply one mutation: compute the new snapshot, persist it, broadcast
    /// it, and return it.
    ///
    /// The write lock is held through persist and broadcast so peers observe
    /// snapshots in seq order.
    pub async fn mutate<F>(&self, op: F) -> Result<GameState, DomainError>
    where
        F: FnOnce(&GameState) -> Result<GameState, DomainError> + Send,
    {
        let mut guard = self.state.write().await;
        let next = op(&guard)?;
        *guard = next.clone();
        self.persist(&next).await;
        self.broadcaster
            .broadcast(
                self.room_id,
                ServerMessage::StateSync {
                    state: next.clone(),
                },
            )
            .await;
        Ok(next)
    }

    async fn persist(&self, state: &GameState) {
        let saved = SavedRoom {
            game_state: state.clone(),
            last_modified: state.last_modified,
            room_creator: self.creator,
        };
        if let Err(e) = self.store.save(self.room_id, &saved).await {
            // A failed save must not block the session; the snapshot is
            // still live in memory and will be written again next mutation.
            tracing::error!(room_id = %self.room_id, error = %e, "Failed to persist room");
        }
    }

    // =========================================================================
    // Transfer negotiation
    // =========================================================================

    /// Offer an inventory slot to another actor.
    ///
    /// Executes immediately unless the recipient is a player-owned
    /// character, in which case a pending intent is recorded for the
    /// recipient's confirmation.
    pub async fn offer_transfer(
        &self,
        from: ActorKey,
        to: ActorKey,
        slot_index: usize,
    ) -> Result<TransferFlow, DomainError> {
        let (item_id, requires_confirmation) = {
            let state = self.state.read().await;
            ops::transfer::validate_offer(&state, from, to, slot_index)?
        };

        if !requires_confirmation {
            let state = self
                .mutate(|s| ops::transfer::execute(s, from, to, slot_index, item_id, Utc::now()))
                .await?;
            return Ok(TransferFlow::Executed(state));
        }

        let intent = TransferIntent {
            id: TransferId::new(),
            item_id,
            from,
            to,
            slot_index,
            requires_confirmation,
            created_at: Utc::now(),
        };
        self.transfers.lock().await.insert(intent.clone());
        Ok(TransferFlow::Pending(intent))
    }

    /// Settle a pending transfer. The intent is removed no matter how the
    /// recipient answered; acceptance executes the slot move.
    pub async fn respond_transfer(
        &self,
        transfer_id: TransferId,
        accept: bool,
    ) -> Result<(TransferIntent, Option<GameState>), DomainError> {
        let intent = self.transfers.lock().await.take(transfer_id)?;
        if !accept {
            return Ok((intent, None));
        }
        let state = self
            .mutate(|s| {
                ops::transfer::execute(
                    s,
                    intent.from,
                    intent.to,
                    intent.slot_index,
                    intent.item_id,
                    Utc::now(),
                )
            })
            .await?;
        Ok((intent, Some(state)))
    }

    /// Withdraw a pending transfer.
    pub async fn cancel_transfer(
        &self,
        transfer_id: TransferId,
    ) -> Result<TransferIntent, DomainError> {
        self.transfers.lock().await.take(transfer_id)
    }

    pub async fn pending_transfer(&self, transfer_id: TransferId) -> Option<TransferIntent> {
        self.transfers.lock().await.get(transfer_id).cloned()
    }

    pub async fn pending_transfer_count(&self) -> usize {
        self.transfers.lock().await.len()
    }
}

/// Registry of open rooms, keyed by room id.
///
/// Sessions are created when the DM joins and dropped when the room closes;
/// pending transfers die with the session.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<GameSession>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: RoomId) -> Option<Arc<GameSession>> {
        self.rooms.get(&room_id).map(|s| s.clone())
    }

    pub fn insert(&self, session: Arc<GameSession>) {
        self.rooms.insert(session.room_id(), session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableforge_domain::{Character, InventorySlot, Item, ItemRef};

    use crate::store::MemoryRoomStore;

    /// Broadcaster that records everything it was asked to send.
    #[derive(Default)]
    pub(crate) struct RecordingBroadcaster {
        pub broadcasts: Mutex<Vec<ServerMessage>>,
        pub targeted: Mutex<Vec<(PlayerId, ServerMessage)>>,
    }

    #[async_trait]
    impl Broadcaster for RecordingBroadcaster {
        async fn broadcast(&self, _room_id: RoomId, message: ServerMessage) {
            self.broadcasts.lock().await.push(message);
        }

        async fn send_to_player(
            &self,
            _room_id: RoomId,
            player_id: PlayerId,
            message: ServerMessage,
        ) {
            self.targeted.lock().await.push((player_id, message));
        }
    }

    struct Fixture {
        session: GameSession,
        broadcaster: Arc<RecordingBroadcaster>,
        sender: ActorKey,
        owned_recipient: ActorKey,
        unowned_recipient: ActorKey,
    }

    fn fixture() -> Fixture {
        let mut state = GameState::new(Utc::now());
        let item = Item::new("Healing Potion").with_uses(2);

        let mut sender = Character::new("Ash", 10, 5, 5);
        sender
            .inventory
            .push(InventorySlot::new(ItemRef::new(item.id), 1));
        let sender_key = ActorKey::Character(sender.id);

        let owned = Character::new("Brin", 10, 5, 5).owned_by(PlayerId::new());
        let owned_key = ActorKey::Character(owned.id);

        let unowned = Character::new("Cort", 10, 5, 5);
        let unowned_key = ActorKey::Character(unowned.id);

        state.catalog.items.insert(item.id, item);
        state.party.push(sender);
        state.party.push(owned);
        state.party.push(unowned);

        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let session = GameSession::new(
            RoomId::new(),
            PlayerId::new(),
            state,
            Arc::new(MemoryRoomStore::new()),
            broadcaster.clone(),
        );
        Fixture {
            session,
            broadcaster,
            sender: sender_key,
            owned_recipient: owned_key,
            unowned_recipient: unowned_key,
        }
    }

    #[tokio::test]
    async fn test_mutate_broadcasts_state_sync() {
        let f = fixture();
        f.session
            .mutate(|s| {
                ops::character::add_character(s, Character::new("Dara", 8, 4, 4), Utc::now())
            })
            .await
            .expect("mutation applies");

        let broadcasts = f.broadcaster.broadcasts.lock().await;
        assert_eq!(broadcasts.len(), 1);
        assert!(matches!(broadcasts[0], ServerMessage::StateSync { .. }));
    }

    #[tokio::test]
    async fn test_failed_mutation_broadcasts_nothing() {
        let f = fixture();
        let missing = ActorKey::Character(tableforge_domain::CharacterId::new());
        let err = f
            .session
            .mutate(|s| {
                ops::character::adjust_stat(
                    s,
                    missing,
                    tableforge_domain::StatKind::Hp,
                    -1,
                    Utc::now(),
                )
            })
            .await
            .expect_err("missing actor");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(f.broadcaster.broadcasts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_to_unowned_executes_immediately() {
        let f = fixture();
        let flow = f
            .session
            .offer_transfer(f.sender, f.unowned_recipient, 0)
            .await
            .expect("offer");
        assert!(matches!(flow, TransferFlow::Executed(_)));
        assert_eq!(f.session.pending_transfer_count().await, 0);
    }

    #[tokio::test]
    async fn test_transfer_to_owned_goes_pending_then_settles_once() {
        let f = fixture();
        let flow = f
            .session
            .offer_transfer(f.sender, f.owned_recipient, 0)
            .await
            .expect("offer");
        let intent = match flow {
            TransferFlow::Pending(intent) => intent,
            TransferFlow::Executed(_) => panic!("owned recipient must confirm"),
        };
        assert_eq!(f.session.pending_transfer_count().await, 1);
        // No broadcast happened: the offer alone mutates nothing.
        assert!(f.broadcaster.broadcasts.lock().await.is_empty());

        let (_, state) = f
            .session
            .respond_transfer(intent.id, true)
            .await
            .expect("respond");
        assert!(state.is_some());
        assert_eq!(f.session.pending_transfer_count().await, 0);

        // The intent is gone; a second settle attempt fails.
        let err = f
            .session
            .respond_transfer(intent.id, true)
            .await
            .expect_err("already settled");
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejected_transfer_discards_intent_without_mutation() {
        let f = fixture();
        let flow = f
            .session
            .offer_transfer(f.sender, f.owned_recipient, 0)
            .await
            .expect("offer");
        let intent = match flow {
            TransferFlow::Pending(intent) => intent,
            TransferFlow::Executed(_) => panic!("owned recipient must confirm"),
        };

        let (_, state) = f
            .session
            .respond_transfer(intent.id, false)
            .await
            .expect("respond");
        assert!(state.is_none());
        assert_eq!(f.session.pending_transfer_count().await, 0);
        assert!(f.broadcaster.broadcasts.lock().await.is_empty());
        // The sender still holds the item.
        let snapshot = f.session.snapshot().await;
        assert_eq!(snapshot.party[0].inventory.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_transfer_discards_intent() {
        let f = fixture();
        let flow = f
            .session
            .offer_transfer(f.sender, f.owned_recipient, 0)
            .await
            .expect("offer");
        let intent = match flow {
            TransferFlow::Pending(intent) => intent,
            TransferFlow::Executed(_) => panic!("owned recipient must confirm"),
        };

        f.session
            .cancel_transfer(intent.id)
            .await
            .expect("cancel");
        assert_eq!(f.session.pending_transfer_count().await, 0);
    }
}
