//! Dispatch-level tests: authorization, validation, and broadcast behavior
//! across the request families, exercised through the same path a socket
//! message takes.

use super::*;

use tokio::sync::mpsc;

use tableforge_domain::{
    Character, CharacterId, GameState, InventorySlot, Item, ItemRef, StatKind,
};
use tableforge_protocol::{CharacterRequest, ItemRequest, TransferRequest};

use crate::images::ImageStore;
use crate::store::MemoryRoomStore;

struct Harness {
    state: Arc<WsState>,
    room_id: RoomId,
    dm_conn: Uuid,
    dm_rx: mpsc::Receiver<ServerMessage>,
    player_conn: Uuid,
    player_rx: mpsc::Receiver<ServerMessage>,
    owned_character: CharacterId,
    unowned_character: CharacterId,
    potion: tableforge_domain::ItemId,
}

/// Build a room with a DM and one player connection, the player owning one
/// of two characters.
async fn harness() -> Harness {
    let state = Arc::new(WsState {
        registry: Arc::new(RoomRegistry::new()),
        connections: Arc::new(ConnectionManager::new()),
        images: Arc::new(ImageStore::new()),
        store: Arc::new(MemoryRoomStore::new()),
    });

    let room_id = RoomId::new();
    let dm_id = PlayerId::new();
    let player_id = PlayerId::new();

    let potion = Item::new("Healing Potion").with_uses(2);
    let potion_id = potion.id;

    let mut game_state = GameState::new(Utc::now());
    let mut owned = Character::new("Ash", 10, 5, 5).owned_by(player_id);
    owned
        .inventory
        .push(InventorySlot::new(ItemRef::new(potion_id), 1));
    let owned_id = owned.id;
    let unowned = Character::new("Brin", 10, 5, 5);
    let unowned_id = unowned.id;
    game_state.catalog.items.insert(potion_id, potion);
    game_state.party.push(owned);
    game_state.party.push(unowned);

    let broadcaster: Arc<dyn Broadcaster> = state.connections.clone();
    let session = Arc::new(GameSession::new(
        room_id,
        dm_id,
        game_state,
        state.store.clone(),
        broadcaster,
    ));
    state.registry.insert(session);

    let dm_conn = Uuid::new_v4();
    let (dm_tx, dm_rx) = mpsc::channel(64);
    state.connections.register(dm_conn, dm_tx);
    state.connections.update(dm_conn, |info| {
        info.player_id = dm_id;
        info.room_id = Some(room_id);
        info.role = RoomRole::Dm;
    });

    let player_conn = Uuid::new_v4();
    let (player_tx, player_rx) = mpsc::channel(64);
    state.connections.register(player_conn, player_tx);
    state.connections.update(player_conn, |info| {
        info.player_id = player_id;
        info.room_id = Some(room_id);
        info.role = RoomRole::Player;
    });

    Harness {
        state,
        room_id,
        dm_conn,
        dm_rx,
        player_conn,
        player_rx,
        owned_character: owned_id,
        unowned_character: unowned_id,
        potion: potion_id,
    }
}

fn expect_error(result: &ResponseResult, expected: ErrorCode) {
    match result {
        ResponseResult::Error { code, .. } => assert_eq!(*code, expected),
        other => panic!("expected {expected:?} error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_player_mutating_foreign_actor_is_forbidden() {
    let mut h = harness().await;
    let result = dispatch(
        &h.state,
        h.player_conn,
        RequestPayload::Character(CharacterRequest::AdjustStat {
            actor: ActorKey::Character(h.unowned_character),
            stat: StatKind::Hp,
            delta: -3,
        }),
    )
    .await;
    expect_error(&result, ErrorCode::Forbidden);
    // Nothing was broadcast.
    assert!(h.dm_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_player_mutating_own_actor_broadcasts_to_everyone() {
    let mut h = harness().await;
    let result = dispatch(
        &h.state,
        h.player_conn,
        RequestPayload::Character(CharacterRequest::AdjustStat {
            actor: ActorKey::Character(h.owned_character),
            stat: StatKind::Hp,
            delta: -3,
        }),
    )
    .await;
    assert!(result.is_success());

    for rx in [&mut h.dm_rx, &mut h.player_rx] {
        match rx.try_recv().expect("state sync broadcast") {
            ServerMessage::StateSync { state } => {
                let hp = state
                    .character(h.owned_character)
                    .map(|c| c.hp)
                    .expect("character present");
                assert_eq!(hp, 7);
            }
            other => panic!("expected StateSync, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_catalog_maintenance_is_dm_only() {
    let h = harness().await;
    let result = dispatch(
        &h.state,
        h.player_conn,
        RequestPayload::Item(ItemRequest::Delete { item_id: h.potion }),
    )
    .await;
    expect_error(&result, ErrorCode::Forbidden);

    let result = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Item(ItemRequest::Delete { item_id: h.potion }),
    )
    .await;
    assert!(result.is_success());

    // Deletion purged the player's inventory reference in the same snapshot.
    let session = h.state.registry.get(h.room_id).expect("room open");
    let snapshot = session.snapshot().await;
    assert!(snapshot.catalog.items.is_empty());
    assert!(snapshot
        .character(h.owned_character)
        .expect("character present")
        .inventory
        .is_empty());
}

#[tokio::test]
async fn test_dm_can_run_any_actor() {
    let h = harness().await;
    let result = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Character(CharacterRequest::AdjustStat {
            actor: ActorKey::Character(h.unowned_character),
            stat: StatKind::Sp,
            delta: -2,
        }),
    )
    .await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_requests_outside_a_room_are_rejected() {
    let h = harness().await;
    let stray = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    h.state.connections.register(stray, tx);

    let result = dispatch(
        &h.state,
        stray,
        RequestPayload::Combat(tableforge_protocol::CombatRequest::Start),
    )
    .await;
    expect_error(&result, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn test_transfer_prompt_reaches_only_the_recipient() {
    let mut h = harness().await;
    // DM hands Brin's inventory to Ash's owner: offer from the unowned
    // character to the player-owned one requires confirmation.
    let give = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Item(ItemRequest::Give {
            actor: ActorKey::Character(h.unowned_character),
            item_id: h.potion,
            count: 1,
        }),
    )
    .await;
    assert!(give.is_success());
    // Drain the give broadcast from both queues.
    let _ = h.dm_rx.try_recv();
    let _ = h.player_rx.try_recv();

    let offer = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Transfer(TransferRequest::Offer {
            from: ActorKey::Character(h.unowned_character),
            to: ActorKey::Character(h.owned_character),
            slot_index: 0,
        }),
    )
    .await;
    assert!(offer.is_success());

    // Only the recipient's owning peer was prompted.
    match h.player_rx.try_recv().expect("transfer prompt") {
        ServerMessage::TransferOffered { transfer_id, .. } => {
            // The recipient accepts; the slot moves and everyone gets the
            // new snapshot.
            let accept = dispatch(
                &h.state,
                h.player_conn,
                RequestPayload::Transfer(TransferRequest::Respond {
                    transfer_id,
                    accept: true,
                }),
            )
            .await;
            assert!(accept.is_success());
        }
        other => panic!("expected TransferOffered, got {other:?}"),
    }
    assert!(h.dm_rx.try_recv().is_ok(), "accept broadcasts a state sync");

    let session = h.state.registry.get(h.room_id).expect("room open");
    assert_eq!(session.pending_transfer_count().await, 0);
    let snapshot = session.snapshot().await;
    assert_eq!(
        snapshot
            .character(h.owned_character)
            .map(|c| c.inventory.len()),
        Some(2)
    );
}

#[tokio::test]
async fn test_foreign_peer_cannot_answer_a_transfer() {
    let mut h = harness().await;
    // Seed a pending transfer: DM offers from the unowned character to the
    // player-owned one.
    let _ = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Item(ItemRequest::Give {
            actor: ActorKey::Character(h.unowned_character),
            item_id: h.potion,
            count: 1,
        }),
    )
    .await;
    let _ = dispatch(
        &h.state,
        h.dm_conn,
        RequestPayload::Transfer(TransferRequest::Offer {
            from: ActorKey::Character(h.unowned_character),
            to: ActorKey::Character(h.owned_character),
            slot_index: 0,
        }),
    )
    .await;
    // The player's queue holds the give broadcast, then the prompt.
    let _ = h.player_rx.try_recv();
    let transfer_id = match h.player_rx.try_recv().expect("transfer prompt") {
        ServerMessage::TransferOffered { transfer_id, .. } => transfer_id,
        other => panic!("expected TransferOffered, got {other:?}"),
    };

    // A third peer with no stake in the transfer tries to answer.
    let intruder_conn = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    h.state.connections.register(intruder_conn, tx);
    h.state.connections.update(intruder_conn, |info| {
        info.player_id = PlayerId::new();
        info.room_id = Some(h.room_id);
        info.role = RoomRole::Player;
    });

    let result = dispatch(
        &h.state,
        intruder_conn,
        RequestPayload::Transfer(TransferRequest::Respond {
            transfer_id,
            accept: true,
        }),
    )
    .await;
    expect_error(&result, ErrorCode::Forbidden);

    // The intent is still pending for the rightful recipient.
    let session = h.state.registry.get(h.room_id).expect("room open");
    assert_eq!(session.pending_transfer_count().await, 1);
}
