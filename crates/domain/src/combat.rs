//! Combat state: turn counter, initiative side, and the position grid
//!
//! Positions live on a fixed 63×63 grid. The structural invariant is that no
//! two actors ever occupy the same cell; every placement and move path checks
//! it before mutating.

use serde::{Deserialize, Serialize};

use crate::actors::ActorKey;
use crate::error::DomainError;

/// Side length of the square combat grid
pub const GRID_SIZE: u8 = 63;

const PARTY_COLUMN: u8 = 27;
const ENEMY_COLUMN: u8 = 35;
/// Center-out row order for default placement
const PREFERRED_ROWS: [u8; 8] = [31, 29, 33, 27, 35, 25, 37, 23];

/// Which side holds initiative this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Party,
    Enemies,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Party => Self::Enemies,
            Self::Enemies => Self::Party,
        }
    }
}

/// A cell on the combat grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPos {
    pub x: u8,
    pub y: u8,
}

impl GridPos {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self) -> bool {
        self.x < GRID_SIZE && self.y < GRID_SIZE
    }
}

/// One actor's position on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub actor: ActorKey,
    pub pos: GridPos,
    /// Previous cell, kept for one turn to draw the movement arrow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move_from: Option<GridPos>,
}

/// Active-combat state; `None` on the snapshot means combat is inactive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatState {
    /// 1-based, monotonic while combat is active
    pub current_turn: u32,
    pub initiative_side: Side,
    #[serde(default)]
    pub positions: Vec<Piece>,
}

impl CombatState {
    pub fn new() -> Self {
        Self {
            current_turn: 1,
            initiative_side: Side::Party,
            positions: Vec::new(),
        }
    }

    pub fn piece(&self, actor: ActorKey) -> Option<&Piece> {
        self.positions.iter().find(|p| p.actor == actor)
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.positions.iter().any(|p| p.pos == pos)
    }

    /// Place an actor at the first free cell among the side's preferred
    /// defaults, falling back to a row-major scan of the whole grid.
    ///
    /// Already-placed actors keep their cell.
    pub fn place_default(&mut self, actor: ActorKey, side: Side) -> Result<GridPos, DomainError> {
        if let Some(piece) = self.piece(actor) {
            return Ok(piece.pos);
        }
        let column = match side {
            Side::Party => PARTY_COLUMN,
            Side::Enemies => ENEMY_COLUMN,
        };
        let preferred = PREFERRED_ROWS
            .iter()
            .map(|&row| GridPos::new(column, row));
        let scan = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| GridPos::new(x, y)));

        let pos = preferred
            .chain(scan)
            .find(|&cell| !self.is_occupied(cell))
            .ok_or(DomainError::GridFull)?;
        self.positions.push(Piece {
            actor,
            pos,
            last_move_from: None,
        });
        Ok(pos)
    }

    /// Place an actor at an explicit cell, replacing any previous position.
    pub fn place_at(&mut self, actor: ActorKey, pos: GridPos) -> Result<(), DomainError> {
        if !pos.in_bounds() {
            return Err(DomainError::constraint(format!(
                "cell ({}, {}) is outside the {GRID_SIZE}x{GRID_SIZE} grid",
                pos.x, pos.y
            )));
        }
        if self.positions.iter().any(|p| p.pos == pos && p.actor != actor) {
            return Err(DomainError::CellOccupied { x: pos.x, y: pos.y });
        }
        if let Some(piece) = self.positions.iter_mut().find(|p| p.actor == actor) {
            piece.pos = pos;
            piece.last_move_from = None;
        } else {
            self.positions.push(Piece {
                actor,
                pos,
                last_move_from: None,
            });
        }
        Ok(())
    }

    /// Move a placed actor, recording the origin for the movement arrow.
    pub fn move_piece(&mut self, actor: ActorKey, to: GridPos) -> Result<(), DomainError> {
        if !to.in_bounds() {
            return Err(DomainError::constraint(format!(
                "cell ({}, {}) is outside the {GRID_SIZE}x{GRID_SIZE} grid",
                to.x, to.y
            )));
        }
        if self.positions.iter().any(|p| p.pos == to && p.actor != actor) {
            return Err(DomainError::CellOccupied { x: to.x, y: to.y });
        }
        let piece = self
            .positions
            .iter_mut()
            .find(|p| p.actor == actor)
            .ok_or_else(|| DomainError::not_found("Piece", actor))?;
        piece.last_move_from = Some(piece.pos);
        piece.pos = to;
        Ok(())
    }

    pub fn remove_piece(&mut self, actor: ActorKey) {
        self.positions.retain(|p| p.actor != actor);
    }

    /// Drop all movement arrows. Called on every turn transition.
    pub fn clear_move_markers(&mut self) {
        for piece in &mut self.positions {
            piece.last_move_from = None;
        }
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CharacterId;

    fn actor() -> ActorKey {
        ActorKey::Character(CharacterId::new())
    }

    #[test]
    fn test_default_placement_prefers_side_column() {
        let mut combat = CombatState::new();
        let pos = combat.place_default(actor(), Side::Party).expect("free grid");
        assert_eq!(pos, GridPos::new(PARTY_COLUMN, 31));

        let pos = combat
            .place_default(actor(), Side::Enemies)
            .expect("free grid");
        assert_eq!(pos, GridPos::new(ENEMY_COLUMN, 31));
    }

    #[test]
    fn test_default_placement_skips_occupied_cells() {
        let mut combat = CombatState::new();
        combat.place_default(actor(), Side::Party).expect("free grid");
        let second = combat.place_default(actor(), Side::Party).expect("free grid");
        assert_eq!(second, GridPos::new(PARTY_COLUMN, 29));
    }

    #[test]
    fn test_default_placement_is_idempotent() {
        let mut combat = CombatState::new();
        let key = actor();
        let first = combat.place_default(key, Side::Party).expect("free grid");
        let second = combat.place_default(key, Side::Party).expect("placed");
        assert_eq!(first, second);
        assert_eq!(combat.positions.len(), 1);
    }

    #[test]
    fn test_default_placement_falls_back_to_scan() {
        let mut combat = CombatState::new();
        for &row in &PREFERRED_ROWS {
            combat
                .place_at(actor(), GridPos::new(PARTY_COLUMN, row))
                .expect("free cell");
        }
        let pos = combat.place_default(actor(), Side::Party).expect("free grid");
        // All preferred cells taken: row-major scan starts at the origin.
        assert_eq!(pos, GridPos::new(0, 0));
    }

    #[test]
    fn test_no_two_actors_share_a_cell() {
        let mut combat = CombatState::new();
        let a = actor();
        let b = actor();
        combat.place_at(a, GridPos::new(5, 5)).expect("free cell");
        let err = combat.place_at(b, GridPos::new(5, 5)).expect_err("occupied");
        assert!(matches!(err, DomainError::CellOccupied { x: 5, y: 5 }));

        combat.place_at(b, GridPos::new(5, 6)).expect("free cell");
        let err = combat.move_piece(b, GridPos::new(5, 5)).expect_err("occupied");
        assert!(matches!(err, DomainError::CellOccupied { .. }));

        // Every produced position map is collision-free.
        for (i, p) in combat.positions.iter().enumerate() {
            for q in &combat.positions[i + 1..] {
                assert_ne!(p.pos, q.pos);
            }
        }
    }

    #[test]
    fn test_move_records_arrow_and_clear_drops_it() {
        let mut combat = CombatState::new();
        let a = actor();
        combat.place_at(a, GridPos::new(1, 1)).expect("free cell");
        combat.move_piece(a, GridPos::new(2, 1)).expect("free cell");
        assert_eq!(
            combat.piece(a).and_then(|p| p.last_move_from),
            Some(GridPos::new(1, 1))
        );

        combat.clear_move_markers();
        assert_eq!(combat.piece(a).and_then(|p| p.last_move_from), None);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut combat = CombatState::new();
        let err = combat
            .place_at(actor(), GridPos::new(GRID_SIZE, 0))
            .expect_err("out of bounds");
        assert!(matches!(err, DomainError::Constraint(_)));
    }
}
