//! Read-mostly replica of the shared snapshot
//!
//! Replaced wholesale on every `StateSync`. The only local mutation is a
//! short-lived optimistic overlay protecting the peer's own recent stat
//! edits from being clobbered by a slightly-stale broadcast.

use chrono::{DateTime, Utc};

use tableforge_domain::{ActorKey, GameState, PlayerId, StatKind};

/// One locally applied, not-yet-confirmed stat edit
#[derive(Debug, Clone)]
pub struct PendingStatEdit {
    pub actor: ActorKey,
    pub stat: StatKind,
    pub delta: i32,
    pub applied_at: DateTime<Utc>,
}

/// The player-side mirror of the room state
pub struct Replica {
    own_player: PlayerId,
    state: Option<GameState>,
    pending_edits: Vec<PendingStatEdit>,
}

impl Replica {
    pub fn new(own_player: PlayerId) -> Self {
        Self {
            own_player,
            state: None,
            pending_edits: Vec::new(),
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Seed the replica from a `RoomJoined` snapshot.
    pub fn set_initial(&mut self, state: GameState) {
        self.state = Some(state);
        self.pending_edits.clear();
    }

    /// Record an optimistic stat edit for the peer's own character and apply
    /// it to the local mirror immediately.
    ///
    /// Edits on actors the peer does not own are not tracked; those wait for
    /// the authoritative broadcast.
    pub fn record_local_edit(
        &mut self,
        actor: ActorKey,
        stat: StatKind,
        delta: i32,
        now: DateTime<Utc>,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let owns = state
            .actor_owner(actor)
            .ok()
            .flatten()
            .is_some_and(|owner| owner == self.own_player);
        if !owns {
            return;
        }
        if let Ok(mut handle) = state.actor_mut(actor) {
            let _ = handle.adjust_stat(stat, delta);
        }
        self.pending_edits.push(PendingStatEdit {
            actor,
            stat,
            delta,
            applied_at: now,
        });
    }

    /// Apply an authoritative broadcast.
    ///
    /// Stale broadcasts (seq not newer than the mirror) are discarded.
    /// Pending edits newer than the broadcast's `last_modified` are
    /// re-applied on top; older ones are confirmed and dropped.
    ///
    /// Returns whether the snapshot was accepted.
    pub fn apply_sync(&mut self, incoming: GameState) -> bool {
        if let Some(current) = &self.state {
            if incoming.seq <= current.seq {
                tracing::debug!(
                    incoming = incoming.seq,
                    held = current.seq,
                    "Discarding stale state broadcast"
                );
                return false;
            }
        }
        self.pending_edits
            .retain(|edit| edit.applied_at > incoming.last_modified);

        let mut next = incoming;
        for edit in &self.pending_edits {
            if let Ok(mut handle) = next.actor_mut(edit.actor) {
                let _ = handle.adjust_stat(edit.stat, edit.delta);
            }
        }
        self.state = Some(next);
        true
    }

    pub fn pending_edit_count(&self) -> usize {
        self.pending_edits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tableforge_domain::Character;

    fn base_state(seq: u64, player: PlayerId) -> (GameState, ActorKey) {
        let mut state = GameState::new(Utc::now());
        let character = Character::new("Ash", 10, 5, 5).owned_by(player);
        let key = ActorKey::Character(character.id);
        state.party.push(character);
        state.seq = seq;
        (state, key)
    }

    #[test]
    fn test_stale_broadcast_discarded() {
        let player = PlayerId::new();
        let (state, _key) = base_state(5, player);
        let mut replica = Replica::new(player);
        replica.set_initial(state.clone());

        let mut stale = state.clone();
        stale.seq = 5;
        assert!(!replica.apply_sync(stale));

        let mut newer = state;
        newer.seq = 6;
        assert!(replica.apply_sync(newer));
    }

    #[test]
    fn test_own_edit_survives_stale_timestamped_broadcast() {
        let player = PlayerId::new();
        let (state, key) = base_state(1, player);
        let mut replica = Replica::new(player);
        replica.set_initial(state.clone());

        // Local optimistic edit after the broadcast's timestamp.
        let edit_time = state.last_modified + Duration::seconds(5);
        replica.record_local_edit(key, StatKind::Hp, -4, edit_time);
        assert_eq!(replica.state().map(|s| s.party[0].hp), Some(6));

        // Authoritative broadcast computed before the edit arrives late.
        let mut broadcast = state.clone();
        broadcast.seq = 2;
        broadcast.last_modified = edit_time - Duration::seconds(1);
        assert!(replica.apply_sync(broadcast));
        // The overlay is re-applied on top of the fresh snapshot.
        assert_eq!(replica.state().map(|s| s.party[0].hp), Some(6));
        assert_eq!(replica.pending_edit_count(), 1);
    }

    #[test]
    fn test_confirmed_edit_is_pruned() {
        let player = PlayerId::new();
        let (state, key) = base_state(1, player);
        let mut replica = Replica::new(player);
        replica.set_initial(state.clone());

        let edit_time = state.last_modified + Duration::seconds(5);
        replica.record_local_edit(key, StatKind::Hp, -4, edit_time);

        // A broadcast stamped after the edit includes its effect.
        let mut broadcast = state.clone();
        broadcast.seq = 2;
        broadcast.party[0].hp = 6;
        broadcast.last_modified = edit_time + Duration::seconds(1);
        assert!(replica.apply_sync(broadcast));
        assert_eq!(replica.pending_edit_count(), 0);
        assert_eq!(replica.state().map(|s| s.party[0].hp), Some(6));
    }

    #[test]
    fn test_foreign_actor_edit_not_tracked() {
        let player = PlayerId::new();
        let (state, key) = base_state(1, PlayerId::new());
        let mut replica = Replica::new(player);
        replica.set_initial(state);

        replica.record_local_edit(key, StatKind::Hp, -4, Utc::now());
        assert_eq!(replica.pending_edit_count(), 0);
    }
}
