//! Room-level transforms: shared display/audio state and save-file import

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::state::{AudioState, DisplayState, GameState};

use super::transformed;

pub fn set_display(
    state: &GameState,
    display: DisplayState,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.display = display;
        Ok(())
    })
}

pub fn set_audio(
    state: &GameState,
    audio: AudioState,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    transformed(state, now, |next| {
        next.audio = audio;
        Ok(())
    })
}

/// Replace the whole snapshot from an imported save.
///
/// The seq counter continues from whichever side is larger so replicas that
/// saw the pre-import state still accept the broadcast.
pub fn import_snapshot(
    state: &GameState,
    mut imported: GameState,
    now: DateTime<Utc>,
) -> Result<GameState, DomainError> {
    imported.strip_player_ownership();
    imported.seq = imported.seq.max(state.seq);
    imported.bump(now);
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Character;
    use crate::ids::PlayerId;

    #[test]
    fn test_import_strips_ownership_and_keeps_seq_monotonic() {
        let now = Utc::now();
        let mut current = GameState::new(now);
        current.seq = 40;

        let mut imported = GameState::new(now);
        imported.seq = 3;
        imported
            .party
            .push(Character::new("Ash", 10, 5, 5).owned_by(PlayerId::new()));

        let next = import_snapshot(&current, imported, now).expect("import");
        assert_eq!(next.seq, 41);
        assert!(next.party[0].player_id.is_none());
    }
}
