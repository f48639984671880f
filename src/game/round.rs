//! Round State Machine
//!
//! Active -> Waiting when a score reaches the threshold, Waiting -> Active
//! when the scheduled restart fires. The restart itself is timed by the
//! engine; this module only performs the transitions.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::game::entity::EntityId;
use crate::game::events::Change;
use crate::game::state::GameState;

impl GameState {
    /// Add one point. Returns true when this ends the round.
    ///
    /// Ignored while waiting for the next round.
    pub fn add_score(&mut self, id: EntityId, now: DateTime<Utc>) -> bool {
        if self.wait_for_round {
            return false;
        }

        let score = self.score.entry(id).or_insert(0);
        *score += 1;
        if *score >= self.config.round_over_score {
            self.queue_new_round(id, now);
            return true;
        }
        false
    }

    /// Enter the waiting phase with `winner` and queue `RoundOver`.
    pub fn queue_new_round(&mut self, winner: EntityId, now: DateTime<Utc>) {
        let wait = chrono::Duration::from_std(self.config.new_round_wait)
            .unwrap_or_else(|_| chrono::Duration::zero());

        self.wait_for_round = true;
        self.round_winner = Some(winner);
        self.new_round_at = now.checked_add_signed(wait);

        info!(round = self.round, winner = ?winner, at = ?self.new_round_at, "Round over");
        self.pending.push(Change::RoundOver { winner, round: self.round });
    }

    /// Leave the waiting phase for round `round`. Returns false when the
    /// arena is not waiting or `round` already restarted.
    ///
    /// Scores are cleared, lasers in flight removed, and every player placed
    /// on a spawn point in id order, starting from the first spawn.
    pub fn start_new_round(&mut self, round: u64) -> bool {
        if !self.wait_for_round || round != self.round {
            return false;
        }

        self.wait_for_round = false;
        self.new_round_at = None;
        self.score.clear();

        let lasers: Vec<EntityId> = self.entities.lasers().map(|l| l.id).collect();
        for id in lasers {
            self.remove_entity(id);
        }

        self.spawn_cursor = 0;
        for id in self.entities.player_ids() {
            let spawn = self.next_spawn_point();
            if let Some(mover) = self.entities.get_mut(id).and_then(|e| e.as_mover()) {
                mover.set_position(spawn);
            }
        }

        self.round += 1;
        info!(round = self.round, "Round started");
        self.pending.push(Change::RoundStart { round: self.round });
        true
    }

    /// Whether actions are currently admitted.
    pub fn is_active(&self) -> bool {
        !self.wait_for_round
    }
}
