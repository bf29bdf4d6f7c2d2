//! Action dispatch: one operation per user-visible verb
//!
//! Every verb goes through the same seam: if this peer is the authoritative
//! side, the mutation is applied to the in-memory snapshot synchronously; if
//! not, the payload is sent to the engine and the correlated, typed result
//! comes back (or a timeout does). The engine re-validates everything either
//! way.

mod local;

pub use local::{ApplyOutcome, LocalSession, StateReplacedCallback};

use std::sync::Arc;

use thiserror::Error;

use tableforge_domain::{
    ActorKey, AudioState, CharacterId, DisplayState, DomainError, EntityId, GridPos, InstanceId,
    ItemId, SkillId, Side, StatKind, TransferId,
};
use tableforge_protocol::{
    CharacterRequest, CombatRequest, CreateCharacterData, EntityRequest, EquipmentRequest,
    ErrorCode, ItemData, ItemRequest, RequestError, RequestPayload, ResponseResult, RoomRequest,
    SkillData, SkillRequest, TransferRequest, UpdateCharacterData,
};

use crate::connection::GameConnectionPort;

/// Failure of a dispatched action
#[derive(Debug, Error)]
pub enum ActionError {
    /// Local-authority path: a domain invariant rejected the mutation
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Remote path: the request never completed
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Remote path: the engine answered with a typed rejection
    #[error("Request rejected ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },
}

/// Who applies this peer's mutations
pub enum Authority {
    /// This peer hosts the room; apply synchronously, no network
    Local(Arc<LocalSession>),
    /// Another peer is authoritative; send and await the typed result
    Remote(Arc<dyn GameConnectionPort>),
}

/// The verb surface the UI layer calls into
pub struct GameActions {
    authority: Authority,
}

impl GameActions {
    pub fn local(session: Arc<LocalSession>) -> Self {
        Self {
            authority: Authority::Local(session),
        }
    }

    pub fn remote(connection: Arc<dyn GameConnectionPort>) -> Self {
        Self {
            authority: Authority::Remote(connection),
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self.authority, Authority::Local(_))
    }

    /// Dispatch a raw payload. The named verbs below are thin wrappers over
    /// this; catalog maintenance the UI rarely touches can call it directly.
    pub async fn execute(
        &self,
        payload: RequestPayload,
    ) -> Result<Option<serde_json::Value>, ActionError> {
        match &self.authority {
            Authority::Local(session) => match session.apply(payload)? {
                ApplyOutcome::Applied => Ok(None),
                ApplyOutcome::TransferPending(intent) => {
                    Ok(Some(serde_json::json!({
                        "executed": false,
                        "transferId": intent.id,
                    })))
                }
            },
            Authority::Remote(connection) => match connection.request(payload).await? {
                ResponseResult::Success { data } => Ok(data),
                ResponseResult::Error { code, message } => {
                    Err(ActionError::Rejected { code, message })
                }
                ResponseResult::Unknown => Err(ActionError::Rejected {
                    code: ErrorCode::Unknown,
                    message: "unrecognized response".into(),
                }),
            },
        }
    }

    // =========================================================================
    // Characters
    // =========================================================================

    pub async fn create_character(
        &self,
        data: CreateCharacterData,
    ) -> Result<Option<serde_json::Value>, ActionError> {
        self.execute(RequestPayload::Character(CharacterRequest::Create { data }))
            .await
    }

    pub async fn update_character(
        &self,
        character_id: CharacterId,
        data: UpdateCharacterData,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Character(CharacterRequest::Update {
            character_id,
            data,
        }))
        .await
        .map(|_| ())
    }

    pub async fn delete_character(&self, character_id: CharacterId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Character(CharacterRequest::Delete {
            character_id,
        }))
        .await
        .map(|_| ())
    }

    pub async fn select_character(&self, character_id: CharacterId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Character(CharacterRequest::Select {
            character_id,
        }))
        .await
        .map(|_| ())
    }

    pub async fn adjust_stat(
        &self,
        actor: ActorKey,
        stat: StatKind,
        delta: i32,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Character(CharacterRequest::AdjustStat {
            actor,
            stat,
            delta,
        }))
        .await
        .map(|_| ())
    }

    // =========================================================================
    // Items and equipment
    // =========================================================================

    pub async fn use_item(&self, actor: ActorKey, slot_index: usize) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Use { actor, slot_index }))
            .await
            .map(|_| ())
    }

    pub async fn discard_item(
        &self,
        actor: ActorKey,
        slot_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Discard {
            actor,
            slot_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn give_item(
        &self,
        actor: ActorKey,
        item_id: ItemId,
        count: u32,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Give {
            actor,
            item_id,
            count,
        }))
        .await
        .map(|_| ())
    }

    pub async fn restore_uses(
        &self,
        actor: ActorKey,
        slot_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::RestoreUses {
            actor,
            slot_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn create_item(
        &self,
        data: ItemData,
    ) -> Result<Option<serde_json::Value>, ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Create { data }))
            .await
    }

    pub async fn update_item(&self, item_id: ItemId, data: ItemData) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Update { item_id, data }))
            .await
            .map(|_| ())
    }

    pub async fn delete_item(&self, item_id: ItemId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Item(ItemRequest::Delete { item_id }))
            .await
            .map(|_| ())
    }

    pub async fn equip(
        &self,
        character_id: CharacterId,
        slot_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Equipment(EquipmentRequest::Equip {
            character_id,
            slot_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn unequip(
        &self,
        character_id: CharacterId,
        equipment_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Equipment(EquipmentRequest::Unequip {
            character_id,
            equipment_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn discard_equipment(
        &self,
        character_id: CharacterId,
        equipment_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Equipment(EquipmentRequest::Discard {
            character_id,
            equipment_index,
        }))
        .await
        .map(|_| ())
    }

    // =========================================================================
    // Skills
    // =========================================================================

    pub async fn use_skill(&self, actor: ActorKey, skill_index: usize) -> Result<(), ActionError> {
        self.execute(RequestPayload::Skill(SkillRequest::Use {
            actor,
            skill_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn learn_skill(&self, actor: ActorKey, skill_id: SkillId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Skill(SkillRequest::Learn { actor, skill_id }))
            .await
            .map(|_| ())
    }

    pub async fn remove_skill(
        &self,
        actor: ActorKey,
        skill_index: usize,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Skill(SkillRequest::Remove {
            actor,
            skill_index,
        }))
        .await
        .map(|_| ())
    }

    pub async fn create_skill(
        &self,
        data: SkillData,
    ) -> Result<Option<serde_json::Value>, ActionError> {
        self.execute(RequestPayload::Skill(SkillRequest::Create { data }))
            .await
    }

    pub async fn delete_skill(&self, skill_id: SkillId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Skill(SkillRequest::Delete { skill_id }))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Combat
    // =========================================================================

    pub async fn start_combat(&self) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::Start))
            .await
            .map(|_| ())
    }

    pub async fn end_combat(&self) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::End))
            .await
            .map(|_| ())
    }

    pub async fn next_turn(&self) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::NextTurn))
            .await
            .map(|_| ())
    }

    pub async fn previous_turn(&self) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::PreviousTurn))
            .await
            .map(|_| ())
    }

    pub async fn request_move(&self, actor: ActorKey, to: GridPos) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::RequestMove {
            actor,
            to,
        }))
        .await
        .map(|_| ())
    }

    pub async fn place_piece(
        &self,
        actor: ActorKey,
        at: Option<GridPos>,
        side: Side,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::PlacePiece {
            actor,
            at,
            side,
        }))
        .await
        .map(|_| ())
    }

    pub async fn move_piece(&self, actor: ActorKey, to: GridPos) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::MovePiece { actor, to }))
            .await
            .map(|_| ())
    }

    pub async fn clear_positions(&self) -> Result<(), ActionError> {
        self.execute(RequestPayload::Combat(CombatRequest::ClearPositions))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    pub async fn offer_transfer(
        &self,
        from: ActorKey,
        to: ActorKey,
        slot_index: usize,
    ) -> Result<Option<serde_json::Value>, ActionError> {
        self.execute(RequestPayload::Transfer(TransferRequest::Offer {
            from,
            to,
            slot_index,
        }))
        .await
    }

    pub async fn respond_transfer(
        &self,
        transfer_id: TransferId,
        accept: bool,
    ) -> Result<(), ActionError> {
        self.execute(RequestPayload::Transfer(TransferRequest::Respond {
            transfer_id,
            accept,
        }))
        .await
        .map(|_| ())
    }

    pub async fn cancel_transfer(&self, transfer_id: TransferId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Transfer(TransferRequest::Cancel {
            transfer_id,
        }))
        .await
        .map(|_| ())
    }

    // =========================================================================
    // Field and room
    // =========================================================================

    pub async fn spawn_entity(&self, entity_id: EntityId) -> Result<Option<serde_json::Value>, ActionError> {
        self.execute(RequestPayload::Entity(EntityRequest::Spawn { entity_id }))
            .await
    }

    pub async fn despawn_entity(&self, instance_id: InstanceId) -> Result<(), ActionError> {
        self.execute(RequestPayload::Entity(EntityRequest::Despawn { instance_id }))
            .await
            .map(|_| ())
    }

    pub async fn set_display(&self, display: DisplayState) -> Result<(), ActionError> {
        self.execute(RequestPayload::Room(RoomRequest::SetDisplay { display }))
            .await
            .map(|_| ())
    }

    pub async fn set_audio(&self, audio: AudioState) -> Result<(), ActionError> {
        self.execute(RequestPayload::Room(RoomRequest::SetAudio { audio }))
            .await
            .map(|_| ())
    }
}
