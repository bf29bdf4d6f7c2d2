//! Local authority: the in-process path for the authoritative peer
//!
//! When the caller hosts the room itself there is no network hop: the verb
//! is applied to the in-memory snapshot synchronously and the state-replaced
//! callback fires. Pending transfers live in a session-scoped book exactly
//! like on the engine.

use std::sync::Mutex;

use chrono::Utc;

use tableforge_domain::{
    ops, Character, DomainError, EntityTemplate, GameState, Item, Skill, StatusEffect,
    TransferBook, TransferId, TransferIntent,
};
use tableforge_protocol::{
    CharacterRequest, CombatRequest, EntityRequest, EquipmentRequest, ItemRequest,
    RequestPayload, RoomRequest, SkillRequest, StatusRequest, TransferRequest,
};

/// Invoked with every replaced snapshot; the embedding application persists
/// and re-renders from here.
pub type StateReplacedCallback = Box<dyn Fn(&GameState) + Send + Sync>;

/// Outcome of a locally applied payload
pub enum ApplyOutcome {
    Applied,
    /// A transfer needs the recipient's confirmation before executing
    TransferPending(TransferIntent),
}

/// The authoritative snapshot when this peer hosts the room
pub struct LocalSession {
    state: Mutex<GameState>,
    transfers: Mutex<TransferBook>,
    on_replace: StateReplacedCallback,
}

impl LocalSession {
    pub fn new(initial: GameState, on_replace: StateReplacedCallback) -> Self {
        Self {
            state: Mutex::new(initial),
            transfers: Mutex::new(TransferBook::new()),
            on_replace,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn pending_transfer_count(&self) -> usize {
        self.transfers.lock().map(|t| t.len()).unwrap_or(0)
    }

    fn replace<F>(&self, op: F) -> Result<(), DomainError>
    where
        F: FnOnce(&GameState) -> Result<GameState, DomainError>,
    {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = op(&guard)?;
        *guard = next;
        (self.on_replace)(&guard);
        Ok(())
    }

    /// Apply one request payload to the local snapshot.
    pub fn apply(&self, payload: RequestPayload) -> Result<ApplyOutcome, DomainError> {
        let now = Utc::now();
        match payload {
            RequestPayload::Character(request) => {
                match request {
                    CharacterRequest::Create { data } => self.replace(|s| {
                        let mut character =
                            Character::new(data.name, data.max_hp, data.max_mp, data.max_sp)
                                .with_sp_regen(data.sp_regen_rate);
                        character.description = data.description;
                        ops::character::add_character(s, character, now)
                    })?,
                    CharacterRequest::Update { character_id, data } => self.replace(|s| {
                        let patch = ops::character::CharacterPatch {
                            name: data.name,
                            description: data.description,
                            max_hp: data.max_hp,
                            max_mp: data.max_mp,
                            max_sp: data.max_sp,
                            sp_regen_rate: data.sp_regen_rate,
                        };
                        ops::character::update_character(s, character_id, patch, now)
                    })?,
                    CharacterRequest::Delete { character_id } => self.replace(|s| {
                        ops::character::delete_character(s, character_id, now)
                    })?,
                    CharacterRequest::Select { .. } => {
                        return Err(DomainError::constraint(
                            "the authoritative peer does not bind characters",
                        ));
                    }
                    CharacterRequest::AdjustStat { actor, stat, delta } => self.replace(|s| {
                        ops::character::adjust_stat(s, actor, stat, delta, now)
                    })?,
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Entity(request) => {
                match request {
                    EntityRequest::Create { data } => self.replace(|s| {
                        let mut template =
                            EntityTemplate::new(data.name, data.max_hp, data.max_sp)
                                .with_sp_regen(data.sp_regen_rate);
                        template.description = data.description;
                        ops::catalog::create_entity(s, template, now)
                    })?,
                    EntityRequest::Update { entity_id, data } => self.replace(|s| {
                        let mut template =
                            EntityTemplate::new(data.name, data.max_hp, data.max_sp)
                                .with_sp_regen(data.sp_regen_rate);
                        template.description = data.description;
                        ops::catalog::update_entity(s, entity_id, template, now)
                    })?,
                    EntityRequest::Delete { entity_id } => {
                        self.replace(|s| ops::catalog::delete_entity(s, entity_id, now))?
                    }
                    EntityRequest::Spawn { entity_id } => {
                        self.replace(|s| ops::character::spawn_field_entity(s, entity_id, now))?
                    }
                    EntityRequest::Despawn { instance_id } => self.replace(|s| {
                        ops::character::remove_field_entity(s, instance_id, now)
                    })?,
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Status(request) => {
                match request {
                    StatusRequest::Create { data } => self.replace(|s| {
                        let mut effect = StatusEffect::new(data.name);
                        effect.description = data.description;
                        ops::catalog::create_status_effect(s, effect, now)
                    })?,
                    StatusRequest::Update { effect_id, data } => self.replace(|s| {
                        let mut effect = StatusEffect::new(data.name);
                        effect.description = data.description;
                        ops::catalog::update_status_effect(s, effect_id, effect, now)
                    })?,
                    StatusRequest::Delete { effect_id } => self.replace(|s| {
                        ops::catalog::delete_status_effect(s, effect_id, now)
                    })?,
                    StatusRequest::Apply { actor, effect_id } => self.replace(|s| {
                        ops::character::apply_status_effect(s, actor, effect_id, now)
                    })?,
                    StatusRequest::Remove { actor, effect_id } => self.replace(|s| {
                        ops::character::remove_status_effect(s, actor, effect_id, now)
                    })?,
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Item(request) => {
                match request {
                    ItemRequest::Use { actor, slot_index } => {
                        self.replace(|s| ops::items::use_item(s, actor, slot_index, now))?
                    }
                    ItemRequest::Discard { actor, slot_index } => {
                        self.replace(|s| ops::items::discard_item(s, actor, slot_index, now))?
                    }
                    ItemRequest::Give {
                        actor,
                        item_id,
                        count,
                    } => self.replace(|s| ops::items::give_item(s, actor, item_id, count, now))?,
                    ItemRequest::RestoreUses { actor, slot_index } => {
                        self.replace(|s| ops::items::restore_uses(s, actor, slot_index, now))?
                    }
                    ItemRequest::Create { data } => self.replace(|s| {
                        let mut item = Item::new(data.name);
                        item.description = data.description;
                        item.uses = data.uses;
                        item.is_equippable = data.is_equippable;
                        item.tags = data.tags.into_iter().collect();
                        ops::items::create_item(s, item, now)
                    })?,
                    ItemRequest::Update { item_id, data } => self.replace(|s| {
                        let mut item = Item::new(data.name);
                        item.description = data.description;
                        item.uses = data.uses;
                        item.is_equippable = data.is_equippable;
                        item.tags = data.tags.into_iter().collect();
                        ops::items::update_item(s, item_id, item, now)
                    })?,
                    ItemRequest::Delete { item_id } => {
                        self.replace(|s| ops::items::delete_item(s, item_id, now))?
                    }
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Equipment(request) => {
                match request {
                    EquipmentRequest::Equip {
                        character_id,
                        slot_index,
                    } => self.replace(|s| ops::equipment::equip(s, character_id, slot_index, now))?,
                    EquipmentRequest::Unequip {
                        character_id,
                        equipment_index,
                    } => self.replace(|s| {
                        ops::equipment::unequip(s, character_id, equipment_index, now)
                    })?,
                    EquipmentRequest::Discard {
                        character_id,
                        equipment_index,
                    } => self.replace(|s| {
                        ops::equipment::discard_equipment(s, character_id, equipment_index, now)
                    })?,
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Skill(request) => {
                match request {
                    SkillRequest::Use { actor, skill_index } => {
                        self.replace(|s| ops::skills::use_skill(s, actor, skill_index, now))?
                    }
                    SkillRequest::Learn { actor, skill_id } => {
                        self.replace(|s| ops::skills::learn_skill(s, actor, skill_id, now))?
                    }
                    SkillRequest::Remove { actor, skill_index } => {
                        self.replace(|s| ops::skills::remove_skill(s, actor, skill_index, now))?
                    }
                    SkillRequest::Create { data } => self.replace(|s| {
                        let mut skill = Skill::new(data.name, data.damage, data.sp_cost);
                        skill.description = data.description;
                        skill.uses = data.uses;
                        ops::skills::create_skill(s, skill, now)
                    })?,
                    SkillRequest::Update { skill_id, data } => self.replace(|s| {
                        let mut skill = Skill::new(data.name, data.damage, data.sp_cost);
                        skill.description = data.description;
                        skill.uses = data.uses;
                        ops::skills::update_skill(s, skill_id, skill, now)
                    })?,
                    SkillRequest::Delete { skill_id } => {
                        self.replace(|s| ops::skills::delete_skill(s, skill_id, now))?
                    }
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Combat(request) => {
                match request {
                    CombatRequest::Start => self.replace(|s| ops::combat::start_combat(s, now))?,
                    CombatRequest::End => self.replace(|s| ops::combat::end_combat(s, now))?,
                    CombatRequest::NextTurn => self.replace(|s| ops::combat::next_turn(s, now))?,
                    CombatRequest::PreviousTurn => {
                        self.replace(|s| ops::combat::previous_turn(s, now))?
                    }
                    CombatRequest::RequestMove { actor, to }
                    | CombatRequest::MovePiece { actor, to } => {
                        self.replace(|s| ops::combat::move_actor(s, actor, to, now))?
                    }
                    CombatRequest::PlacePiece { actor, at, side } => {
                        self.replace(|s| ops::combat::place_piece(s, actor, at, side, now))?
                    }
                    CombatRequest::ClearPositions => {
                        self.replace(|s| ops::combat::clear_positions(s, now))?
                    }
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Transfer(request) => match request {
                TransferRequest::Offer {
                    from,
                    to,
                    slot_index,
                } => {
                    let (item_id, requires_confirmation) = {
                        let guard = match self.state.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        ops::transfer::validate_offer(&guard, from, to, slot_index)?
                    };
                    if !requires_confirmation {
                        self.replace(|s| {
                            ops::transfer::execute(s, from, to, slot_index, item_id, now)
                        })?;
                        return Ok(ApplyOutcome::Applied);
                    }
                    let intent = TransferIntent {
                        id: TransferId::new(),
                        item_id,
                        from,
                        to,
                        slot_index,
                        requires_confirmation,
                        created_at: now,
                    };
                    if let Ok(mut book) = self.transfers.lock() {
                        book.insert(intent.clone());
                    }
                    Ok(ApplyOutcome::TransferPending(intent))
                }
                TransferRequest::Respond {
                    transfer_id,
                    accept,
                } => {
                    let intent = match self.transfers.lock() {
                        Ok(mut book) => book.take(transfer_id)?,
                        Err(poisoned) => poisoned.into_inner().take(transfer_id)?,
                    };
                    if accept {
                        self.replace(|s| {
                            ops::transfer::execute(
                                s,
                                intent.from,
                                intent.to,
                                intent.slot_index,
                                intent.item_id,
                                now,
                            )
                        })?;
                    }
                    Ok(ApplyOutcome::Applied)
                }
                TransferRequest::Cancel { transfer_id } => {
                    match self.transfers.lock() {
                        Ok(mut book) => book.take(transfer_id)?,
                        Err(poisoned) => poisoned.into_inner().take(transfer_id)?,
                    };
                    Ok(ApplyOutcome::Applied)
                }
            },

            RequestPayload::Room(request) => {
                match request {
                    RoomRequest::GetState => {}
                    RoomRequest::SetDisplay { display } => {
                        self.replace(|s| ops::room::set_display(s, display, now))?
                    }
                    RoomRequest::SetAudio { audio } => {
                        self.replace(|s| ops::room::set_audio(s, audio, now))?
                    }
                    RoomRequest::Export | RoomRequest::Import { .. } => {
                        return Err(DomainError::constraint(
                            "save files are handled by the embedding application in local mode",
                        ));
                    }
                }
                Ok(ApplyOutcome::Applied)
            }

            RequestPayload::Image(_) => Err(DomainError::constraint(
                "image transfer requires a remote engine",
            )),
        }
    }
}
