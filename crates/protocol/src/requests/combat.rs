//! Combat request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, GridPos, Side};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatRequest {
    Start,
    End,
    NextTurn,
    PreviousTurn,
    /// Player move request; rejected unless the requester owns the actor
    RequestMove {
        actor: ActorKey,
        to: GridPos,
    },
    /// DM-only: place a piece explicitly or at the side's default cells
    PlacePiece {
        actor: ActorKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<GridPos>,
        side: Side,
    },
    /// DM-only: move any piece
    MovePiece {
        actor: ActorKey,
        to: GridPos,
    },
    /// DM-only: wipe the position grid
    ClearPositions,
}
