//! Snapshot building for renderers and state relay

use serde::{Deserialize, Serialize};

use super::combatant::Combatant;
use super::effects::EffectPool;
use super::r#match::{DuelEvent, GameState, MatchSetup};
use super::round::RoundPhase;

/// Read-only view of a duel at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelSnapshot {
    pub tick: u64,
    pub setup: MatchSetup,
    pub phase: RoundPhase,
    pub round: u32,
    pub wins: [u32; 2],
    pub intro_timer: u32,
    pub round_cooldown: u32,
    pub hitstop: u32,
    pub p1: Combatant,
    pub p2: Combatant,
    pub effects: EffectPool,
    /// Events since the previous published snapshot
    #[serde(default)]
    pub events: Vec<DuelEvent>,
}

impl DuelSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            tick: state.tick,
            setup: state.setup.clone(),
            phase: state.phase(),
            round: state.rounds.round,
            wins: state.rounds.wins,
            intro_timer: state.rounds.intro_timer,
            round_cooldown: state.rounds.round_cooldown,
            hitstop: state.hitstop,
            p1: state.p1.clone(),
            p2: state.p2.clone(),
            effects: state.effects.clone(),
            events: Vec::new(),
        }
    }
}

/// Throttles how often a host publishes snapshots
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
    /// Events accumulated since the last build
    pending_events: Vec<DuelEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending_events: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Queue tick events; round transitions force the next snapshot out
    pub fn record(&mut self, events: Vec<DuelEvent>) {
        let transition = events.iter().any(|e| {
            matches!(
                e,
                DuelEvent::RoundOver { .. }
                    | DuelEvent::MatchOver { .. }
                    | DuelEvent::RoundStarted { .. }
            )
        });
        if transition {
            self.force_next();
        }
        self.pending_events.extend(events);
    }

    /// Build a snapshot carrying every event recorded since the last one
    pub fn build(&mut self, state: &GameState) -> DuelSnapshot {
        let mut snapshot = DuelSnapshot::capture(state);
        snapshot.events = std::mem::take(&mut self.pending_events);
        snapshot
    }
}
