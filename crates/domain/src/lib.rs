//! Tableforge Domain - the shared tabletop model
//!
//! Defines the catalog/reference data model, the `GameState` snapshot, and
//! the pure transforms every mutation funnels through. The crate is free of
//! I/O and async so both the authoritative engine and the player-side local
//! dispatch path can apply the same rules.

pub mod actors;
pub mod catalog;
pub mod combat;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod ops;
pub mod refs;
pub mod state;
pub mod stats;
pub mod transfer;

// Re-export the working vocabulary
pub use actors::{ActorKey, ActorMut, ActorRef, Character, EntityInstance};
pub use catalog::{Catalog, EntityTemplate, ImageMeta, Item, Skill, StatusEffect};
pub use combat::{CombatState, GridPos, Piece, Side, GRID_SIZE};
pub use error::DomainError;
pub use ids::{
    CharacterId, EntityId, ImageId, InstanceId, ItemId, PlayerId, RoomId, SkillId,
    StatusEffectId, TransferId,
};
pub use inventory::InventorySlot;
pub use refs::{ItemRef, SkillRef, StatusEffectRef};
pub use state::{AudioState, DisplayState, GameState};
pub use stats::StatKind;
pub use transfer::{TransferBook, TransferIntent};
