//! Combat lifecycle and turn-navigation transforms
//!
//! Turn navigation is symmetric by design: advancing regenerates SP, going
//! back takes the same amount away, so the DM can undo a turn without
//! desyncing anyone's resources.

use chrono::{DateTime, Utc};

use crate::actors::ActorKey;
use crate::combat::{CombatState, GridPos, Side};
use crate::error::DomainError;
use crate::state::GameState;
use crate::stats::apply_delta;

use super::transformed;

/// Start combat and auto-place every combatant.
///
/// Actors that cannot be placed (grid exhausted) are skipped; combat still
/// starts for everyone else.
pub fn start_combat(state: &GameState, now: DateTime<Utc>) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if next.combat.is_some() {
            return Err(DomainError::constraint("combat is already active"));
        }
        let mut combat = CombatState::new();
        for (key, side) in next.combatant_keys() {
            let _ = combat.place_default(key, side);
        }
        next.combat = Some(combat);
        Ok(())
    })
}

pub fn end_combat(state: &GameState, now: DateTime<Utc>) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        if next.combat.take().is_none() {
            return Err(DomainError::constraint("combat is not active"));
        }
        Ok(())
    })
}

fn regen_all(next: &mut GameState, direction: i32) {
    for character in &mut next.party {
        let delta = direction.saturating_mul(character.sp_regen_rate as i32);
        character.sp = apply_delta(character.sp, character.max_sp, delta);
    }
    for instance in &mut next.field {
        let delta = direction.saturating_mul(instance.sp_regen_rate as i32);
        instance.sp = apply_delta(instance.sp, instance.max_sp, delta);
    }
}

pub fn next_turn(state: &GameState, now: DateTime<Utc>) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let combat = next.combat_mut()?;
        combat.current_turn += 1;
        combat.initiative_side = combat.initiative_side.other();
        combat.clear_move_markers();
        regen_all(next, 1);
        Ok(())
    })
}

/// Step the turn counter back, reversing the SP regeneration of the skipped
/// turn. Rejected at the first turn.
pub fn previous_turn(state: &GameState, now: DateTime<Utc>) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        let combat = next.combat_mut()?;
        if combat.current_turn <= 1 {
            return Err(DomainError::constraint("combat is at the first turn"));
        }
        combat.current_turn -= 1;
        combat.initiative_side = combat.initiative_side.other();
        combat.clear_move_markers();
        regen_all(next, -1);
        Ok(())
    })
}

/// Move an actor's piece. Ownership is authorized by the caller; this only
/// enforces grid invariants.
pub fn move_actor(
    state: &GameState,
    actor: ActorKey,
    to: GridPos,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| next.combat_mut()?.move_piece(actor, to))
}

/// Place a piece explicitly (given cell) or at the side's default cells.
pub fn place_piece(
    state: &GameState,
    actor: ActorKey,
    at: Option<GridPos>,
    side: Side,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.actor_owner(actor)?;
        let combat = next.combat_mut()?;
        match at {
            Some(pos) => combat.place_at(actor, pos),
            None => combat.place_default(actor, side).map(|_| ()),
        }
    })
}

pub fn clear_positions(state: &GameState, now: DateTime<Utc>) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.combat_mut()?.positions.clear();
        Ok(())
    })
}
