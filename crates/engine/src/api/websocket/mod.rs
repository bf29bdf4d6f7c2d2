//! WebSocket handling for peer connections
//!
//! One socket per peer. Every mutation request is answered with a correlated
//! `Response`; applied mutations additionally reach everyone in the room as
//! a `StateSync` broadcast.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

mod ws_character;
mod ws_combat;
mod ws_entity;
mod ws_equipment;
mod ws_image;
mod ws_items;
mod ws_room;
mod ws_skill;
mod ws_status;
mod ws_transfer;

#[cfg(test)]
mod ws_integration_tests;

use chrono::Utc;

use tableforge_domain::{ActorKey, DomainError, GameState, PlayerId, RoomId};
use tableforge_protocol::{
    ClientMessage, ConnectedUser, ErrorCode, JoinError, RequestPayload, ResponseResult,
    RoomRole, ServerMessage,
};

use super::connections::{ConnectionInfo, ConnectionManager};
use crate::images::{ImageError, ImageStore};
use crate::session::{Broadcaster, GameSession, RoomRegistry};
use crate::store::{RoomStore, SavedRoom};

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub registry: Arc<RoomRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub images: Arc<ImageStore>,
    pub store: Arc<dyn RoomStore>,
}

/// Per-request context handed to the family handlers.
pub(super) struct RequestCtx<'a> {
    pub state: &'a WsState,
    pub conn: &'a ConnectionInfo,
    pub session: Arc<GameSession>,
}

// =============================================================================
// Handler errors
// =============================================================================

/// Failure inside a request handler, mapped to a typed response for the
/// requester. The DM-side snapshot is never mutated on any of these.
pub(super) enum HandlerError {
    /// Requester's role or ownership does not allow the operation
    Forbidden(&'static str),
    /// A domain invariant rejected the mutation
    Domain(DomainError),
    /// Image pipeline failure
    Image(ImageError),
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ImageError> for HandlerError {
    fn from(err: ImageError) -> Self {
        Self::Image(err)
    }
}

impl HandlerError {
    fn into_response(self) -> ResponseResult {
        match self {
            Self::Forbidden(msg) => ResponseResult::error(ErrorCode::Forbidden, msg),
            Self::Domain(err) => {
                let code = match &err {
                    DomainError::NotFound { .. } => ErrorCode::NotFound,
                    DomainError::Unauthorized(_) => ErrorCode::Forbidden,
                    DomainError::InvalidSlot { .. } => ErrorCode::BadRequest,
                    _ => ErrorCode::Conflict,
                };
                ResponseResult::error(code, err.to_string())
            }
            Self::Image(err) => {
                let code = match &err {
                    ImageError::UnknownImage(_) | ImageError::UnknownUpload(_) => {
                        ErrorCode::NotFound
                    }
                    _ => ErrorCode::ValidationError,
                };
                ResponseResult::error(code, err.to_string())
            }
        }
    }
}

pub(super) type HandlerResult = Result<ResponseResult, HandlerError>;

/// Require the requester to be the room's DM.
pub(super) fn require_dm(conn: &ConnectionInfo) -> Result<(), HandlerError> {
    if conn.is_dm() {
        Ok(())
    } else {
        Err(HandlerError::Forbidden("this operation is DM-only"))
    }
}

/// Require the requester to be the DM or the owner of the target actor.
///
/// Unowned actors (NPCs, field entities, global entities) are DM-only.
pub(super) async fn authorize_actor(
    ctx: &RequestCtx<'_>,
    actor: ActorKey,
) -> Result<(), HandlerError> {
    if ctx.conn.is_dm() {
        // Existence is still validated so the DM gets a NotFound instead of
        // a confusing downstream error.
        let state = ctx.session.snapshot().await;
        state.actor_owner(actor)?;
        return Ok(());
    }
    let state = ctx.session.snapshot().await;
    match state.actor_owner(actor)? {
        Some(owner) if owner == ctx.conn.player_id => Ok(()),
        _ => Err(HandlerError::Forbidden(
            "requester does not control this actor",
        )),
    }
}

// =============================================================================
// Socket lifecycle
// =============================================================================

pub async fn ws_handler(State(state): State<Arc<WsState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let connection_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                let client_message: ClientMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Malformed client message");
                        continue;
                    }
                };
                handle_message(&state, connection_id, &tx, client_message).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Socket gone: announce the departure to the peer's room.
    if let Some(info) = state.connections.unregister(connection_id) {
        if let Some(room_id) = info.room_id {
            state
                .connections
                .broadcast(
                    room_id,
                    ServerMessage::UserLeft {
                        player_id: info.player_id,
                    },
                )
                .await;
        }
    }
    writer.abort();
}

async fn handle_message(
    state: &Arc<WsState>,
    connection_id: Uuid,
    tx: &mpsc::Sender<ServerMessage>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::JoinRoom {
            room_id,
            player_id,
            display_name,
            role,
        } => {
            let reply =
                handle_join(state, connection_id, room_id, player_id, display_name, role).await;
            let _ = tx.send(reply).await;
        }
        ClientMessage::LeaveRoom => {
            handle_leave(state, connection_id).await;
        }
        ClientMessage::Request {
            request_id,
            payload,
        } => {
            let result = dispatch(state, connection_id, payload).await;
            let _ = tx
                .send(ServerMessage::Response { request_id, result })
                .await;
        }
        ClientMessage::Heartbeat => {
            let _ = tx.send(ServerMessage::Pong).await;
        }
        ClientMessage::Unknown => {
            tracing::debug!(connection_id = %connection_id, "Ignoring unknown client message");
        }
    }
}

// =============================================================================
// Join / leave
// =============================================================================

async fn handle_join(
    state: &Arc<WsState>,
    connection_id: Uuid,
    room_id: RoomId,
    player_id: PlayerId,
    display_name: Option<String>,
    role: RoomRole,
) -> ServerMessage {
    let role = match role {
        RoomRole::Dm => RoomRole::Dm,
        _ => RoomRole::Player,
    };

    let session = match state.registry.get(room_id) {
        Some(session) => {
            if role.is_dm() && state.connections.dm_connected(room_id) {
                return ServerMessage::JoinRejected {
                    reason: JoinError::DmAlreadyConnected,
                };
            }
            session
        }
        None => {
            // Only the DM opens a room; players need a live session.
            if !role.is_dm() {
                return ServerMessage::JoinRejected {
                    reason: JoinError::RoomNotFound,
                };
            }
            let (game_state, creator) = match state.store.load(room_id).await {
                Ok(Some(saved)) => (saved.game_state, saved.room_creator),
                Ok(None) => (GameState::new(Utc::now()), player_id),
                Err(e) => {
                    tracing::error!(room_id = %room_id, error = %e, "Failed to load room");
                    (GameState::new(Utc::now()), player_id)
                }
            };
            let broadcaster: Arc<dyn Broadcaster> = state.connections.clone();
            let session = Arc::new(GameSession::new(
                room_id,
                creator,
                game_state,
                state.store.clone(),
                broadcaster,
            ));
            // First save so a freshly created room exists on disk even
            // before its first mutation.
            let saved = SavedRoom {
                game_state: session.snapshot().await,
                last_modified: Utc::now(),
                room_creator: creator,
            };
            if let Err(e) = state.store.save(room_id, &saved).await {
                tracing::error!(room_id = %room_id, error = %e, "Failed to persist new room");
            }
            state.registry.insert(session.clone());
            session
        }
    };

    state.connections.update(connection_id, |info| {
        info.player_id = player_id;
        info.display_name = display_name.clone();
        info.room_id = Some(room_id);
        info.role = role;
    });

    let snapshot = session.snapshot().await;
    let joined_user = connected_user(&snapshot, player_id, display_name, role);
    state
        .connections
        .broadcast(
            room_id,
            ServerMessage::UserJoined {
                user: joined_user,
            },
        )
        .await;

    let users = state
        .connections
        .peers_in_room(room_id)
        .into_iter()
        .map(|peer| connected_user(&snapshot, peer.player_id, peer.display_name, peer.role))
        .collect();

    tracing::info!(room_id = %room_id, player_id = %player_id, role = ?role, "Peer joined room");
    ServerMessage::RoomJoined {
        room_id,
        role,
        state: snapshot,
        users,
    }
}

fn connected_user(
    state: &GameState,
    player_id: PlayerId,
    display_name: Option<String>,
    role: RoomRole,
) -> ConnectedUser {
    ConnectedUser {
        player_id,
        display_name,
        role,
        character_id: state
            .party
            .iter()
            .find(|c| c.player_id == Some(player_id))
            .map(|c| c.id),
    }
}

async fn handle_leave(state: &Arc<WsState>, connection_id: Uuid) {
    let Some(info) = state.connections.get(connection_id) else {
        return;
    };
    let Some(room_id) = info.room_id else {
        return;
    };
    state.connections.update(connection_id, |info| {
        info.room_id = None;
    });
    state
        .connections
        .broadcast(
            room_id,
            ServerMessage::UserLeft {
                player_id: info.player_id,
            },
        )
        .await;
}

// =============================================================================
// Request dispatch
// =============================================================================

async fn dispatch(
    state: &WsState,
    connection_id: Uuid,
    payload: RequestPayload,
) -> ResponseResult {
    let Some(conn) = state.connections.get(connection_id) else {
        return ResponseResult::error(ErrorCode::InternalError, "connection not registered");
    };
    let Some(room_id) = conn.room_id else {
        return ResponseResult::error(ErrorCode::Unauthorized, "join a room first");
    };
    let Some(session) = state.registry.get(room_id) else {
        return ResponseResult::error(ErrorCode::NotFound, "room is not open");
    };

    let channel = payload.channel();
    let ctx = RequestCtx {
        state,
        conn: &conn,
        session,
    };
    let result = match payload {
        RequestPayload::Character(req) => ws_character::handle_character_request(&ctx, req).await,
        RequestPayload::Entity(req) => ws_entity::handle_entity_request(&ctx, req).await,
        RequestPayload::Status(req) => ws_status::handle_status_request(&ctx, req).await,
        RequestPayload::Item(req) => ws_items::handle_item_request(&ctx, req).await,
        RequestPayload::Equipment(req) => {
            ws_equipment::handle_equipment_request(&ctx, req).await
        }
        RequestPayload::Skill(req) => ws_skill::handle_skill_request(&ctx, req).await,
        RequestPayload::Combat(req) => ws_combat::handle_combat_request(&ctx, req).await,
        RequestPayload::Transfer(req) => ws_transfer::handle_transfer_request(&ctx, req).await,
        RequestPayload::Room(req) => ws_room::handle_room_request(&ctx, req).await,
        RequestPayload::Image(req) => ws_image::handle_image_request(&ctx, req).await,
    };
    result.unwrap_or_else(|err| {
        let response = err.into_response();
        if let ResponseResult::Error { code, message } = &response {
            tracing::debug!(channel, ?code, reason = %message, "Request rejected");
        }
        response
    })
}
