//! Pure snapshot transforms
//!
//! Every user-visible verb is a function `&GameState -> Result<GameState>`:
//! clone the snapshot, apply exactly one mutation, bump seq and timestamp.
//! The authoritative engine and the local-authority dispatch path both call
//! these; nothing here touches I/O.

pub mod catalog;
pub mod character;
pub mod combat;
pub mod equipment;
pub mod items;
pub mod room;
pub mod skills;
pub mod transfer;

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::state::GameState;

/// Clone-transform-bump helper shared by all ops.
fn transformed<F>(
    state: &GameState,
    now: DateTime<Utc>,
    f: F,
) -> Result<GameState, DomainError>
where
    F: FnOnce(&mut GameState) -> Result<(), DomainError>,
{
    let mut next = state.clone();
    f(&mut next)?;
    next.bump(now);
    Ok(next)
}
